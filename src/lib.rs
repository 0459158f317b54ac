//! An asynchronous single-shot HTTP/1.1 POST endpoint
//!
//! This crate implements a deliberately small HTTP/1.1 server built on
//! top of tokio: every accepted connection carries exactly one exchange.
//! A `POST` body is framed by its declared `Content-Length`, completed
//! with a bounded read when it arrived short, and echoed back as JSON;
//! `HEAD` answers immediately as a liveness probe; everything else maps
//! to a fixed status code. The connection is then shut down; there is
//! no keep-alive.
//!
//! # Example
//!
//! ```no_run
//! use pico_post::server::Server;
//!
//! fn main() -> std::io::Result<()> {
//!     let mut server = Server::builder()
//!         .address(("0.0.0.0", 7777))
//!         .build()
//!         .expect("valid server configuration");
//!
//!     server.start()?;
//!     server.wait_for_shutdown()?;
//!     server.stop();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`server`]: runtime ownership, the accept loop and shutdown
//!   coordination
//! - [`connection`]: the per-connection state machine, from request
//!   line to teardown
//! - [`codec`]: request decoding and response encoding over
//!   `tokio_util` framing
//! - [`protocol`]: the shared request/response/status/error types
//!
//! Scheduling is a single multi-threaded tokio runtime: any worker may
//! run any connection's next step, while each connection itself stays
//! strictly sequential inside its own task. Connections share no
//! mutable state, so there is no inter-connection locking anywhere.
//!
//! # Limitations
//!
//! - One request per connection; no keep-alive
//! - No chunked transfer-encoding; bodies are `Content-Length` framed
//! - `POST` and `HEAD` only; other methods are answered with 501
//! - `HTTP/1.1` only; other versions are answered with 505
//! - No TLS (use a reverse proxy for HTTPS)
//! - Maximum head size: 4KB

pub mod codec;
pub mod connection;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
