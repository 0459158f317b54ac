//! Response representation.

use bytes::Bytes;

use crate::protocol::Status;

/// A complete response: a status and an optional echoed body.
///
/// A connection constructs exactly one of these, at a terminal decision
/// point of its state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    body: Bytes,
}

impl Response {
    /// A response carrying only a status line.
    pub fn empty(status: Status) -> Self {
        Self { status, body: Bytes::new() }
    }

    /// A response carrying a body.
    pub fn with_body(status: Status, body: Bytes) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
