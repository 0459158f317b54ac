//! Connection handling.
//!
//! [`HttpConnection`] owns one accepted connection for its whole life:
//! request parsing, the dispatch decision, response serialization and
//! teardown all happen inside a single async task, which is also the
//! connection's owner: when the task finishes, the connection and its
//! buffers are gone.

mod http_connection;

pub use http_connection::HttpConnection;
