use std::process::ExitCode;

use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use pico_post::server::Server;

const DEFAULT_PORT: u16 = 7777;

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut server = match Server::builder().address(("0.0.0.0", DEFAULT_PORT)).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(port = DEFAULT_PORT, workers = server.worker_threads(), "start listening");
    if let Err(e) = server.start() {
        error!(cause = %e, "bind server error");
        return ExitCode::FAILURE;
    }

    if let Err(e) = server.wait_for_shutdown() {
        error!(cause = %e, "can't wait for the shutdown signal");
    }
    server.stop();
    ExitCode::SUCCESS
}
