//! Listener acceptance and runtime ownership.
//!
//! - [`Acceptor`]: the perpetual accept loop, one spawned
//!   [`HttpConnection`](crate::connection::HttpConnection) task per
//!   accepted connection, stoppable through an [`AcceptorHandle`]
//! - [`Server`]: owns the multi-threaded runtime the whole process
//!   shares and coordinates startup and shutdown
//!
//! The listening socket belongs solely to the acceptor; each accepted
//! stream belongs solely to its connection task.

mod acceptor;
pub use acceptor::Acceptor;
pub use acceptor::AcceptorHandle;

mod runtime;
pub use runtime::Server;
pub use runtime::ServerBuildError;
pub use runtime::ServerBuilder;
