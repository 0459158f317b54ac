use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::{self, Runtime};
use tokio::signal;
use tokio::time;
use tracing::{info, warn};

use crate::server::{Acceptor, AcceptorHandle};

/// Fallback worker count when hardware parallelism cannot be queried.
const DEFAULT_WORKER_THREADS: usize = 2;

/// How long `stop` waits for in-flight connections before tearing the
/// runtime down anyway.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<Vec<SocketAddr>>,
    worker_threads: Option<usize>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, worker_threads: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().unwrap().collect::<Vec<_>>());
        self
    }

    /// Fixes the worker pool size. When unset, hardware parallelism × 2
    /// is used, falling back to 2 when it cannot be queried.
    pub fn worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?;
        let worker_threads = match self.worker_threads {
            Some(0) => return Err(ServerBuildError::ZeroWorkerThreads),
            Some(n) => n,
            None => default_worker_threads(),
        };
        Ok(Server { address, worker_threads, runtime: None, acceptor: None })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("worker thread count must be greater than zero")]
    ZeroWorkerThreads,
}

/// Owns the shared runtime, the I/O driver plus a fixed pool of worker
/// threads, and the acceptor running on it.
///
/// The lifecycle spans one start/stop cycle and the pool never
/// rescales. Any worker may pick up any connection's next step; a
/// single connection stays sequential because one task drives it.
#[derive(Debug)]
pub struct Server {
    address: Vec<SocketAddr>,
    worker_threads: usize,
    runtime: Option<Runtime>,
    acceptor: Option<AcceptorHandle>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Builds the runtime, binds the listener and spawns the accept
    /// loop. Returns the bound address, so callers binding port 0 can
    /// learn the actual port.
    pub fn start(&mut self) -> io::Result<SocketAddr> {
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(self.worker_threads)
            .thread_name("pico-post-worker")
            .enable_all()
            .build()?;

        let listener = runtime.block_on(TcpListener::bind(self.address.as_slice()))?;
        let acceptor = Acceptor::new(listener);
        let local_addr = acceptor.local_addr()?;
        let handle = acceptor.handle();
        runtime.spawn(acceptor.run());

        self.runtime = Some(runtime);
        self.acceptor = Some(handle);
        info!(addr = %local_addr, workers = self.worker_threads, "server started");
        Ok(local_addr)
    }

    /// Blocks until Ctrl-C. A no-op when the server was never started.
    pub fn wait_for_shutdown(&self) -> io::Result<()> {
        match &self.runtime {
            Some(runtime) => runtime.block_on(signal::ctrl_c()),
            None => Ok(()),
        }
    }

    /// Stops accepting, lets in-flight connections finish within the
    /// grace period, then shuts the runtime down and joins the worker
    /// threads.
    pub fn stop(mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        if let Some(handle) = self.acceptor.take() {
            handle.stop();
            let drained = runtime.block_on(time::timeout(SHUTDOWN_GRACE, handle.drained()));
            if drained.is_err() {
                warn!("shutdown grace elapsed, aborting remaining connections");
            }
        }

        runtime.shutdown_timeout(SHUTDOWN_GRACE);
        info!("server stopped");
    }
}

fn default_worker_threads() -> usize {
    thread::available_parallelism().map(|n| n.get() * 2).unwrap_or(DEFAULT_WORKER_THREADS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    #[test]
    fn build_requires_an_address() {
        let error = Server::builder().build().unwrap_err();
        assert!(matches!(error, ServerBuildError::MissingAddress));
    }

    #[test]
    fn build_rejects_zero_workers() {
        let error = Server::builder().address(("127.0.0.1", 0)).worker_threads(0).build().unwrap_err();
        assert!(matches!(error, ServerBuildError::ZeroWorkerThreads));
    }

    #[test]
    fn default_worker_count_is_positive() {
        let server = Server::builder().address(("127.0.0.1", 0)).build().unwrap();
        assert!(server.worker_threads() >= 2);
    }

    #[test]
    fn round_trip_over_real_sockets() {
        let mut server = Server::builder().address(("127.0.0.1", 0)).worker_threads(2).build().unwrap();
        let addr = server.start().unwrap();

        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"POST /ingest HTTP/1.1\r\nContent-Length: 9\r\n\r\n{\"id\":42}").unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).unwrap();

        let text = String::from_utf8(response).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("{\"id\":42}"));

        server.stop();
        assert!(TcpStream::connect(addr).is_err(), "listener should be closed after stop");
    }
}
