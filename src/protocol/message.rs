use bytes::Bytes;

use crate::protocol::RequestLine;

/// A decoded piece of the inbound request stream.
///
/// The decoder yields exactly one `Line` per connection and then, if the
/// connection goes on reading, one `Payload` once the blank-line
/// delimiter has been buffered.
#[derive(Debug)]
pub enum RequestPart {
    /// The parsed request line, plus the content length scanned from the
    /// header bytes that were already buffered alongside it.
    Line { line: RequestLine, content_length: u64 },
    /// Body bytes available after the head was cut at the blank line.
    Payload(PayloadPrefix),
}

/// The part of the declared body that was buffered when the head was
/// cut, and how many bytes the peer still owes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPrefix {
    pub chunk: Bytes,
    pub shortfall: u64,
}

impl RequestPart {
    /// Returns true if this part carries body bytes.
    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, RequestPart::Payload(_))
    }

    /// Returns true if this part carries the request line.
    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, RequestPart::Line { .. })
    }
}
