//! Response serialization.
//!
//! Serializes a [`Response`] into status line, headers, blank-line
//! terminator and body as one contiguous buffer, so the whole response
//! goes out in a single write. Empty-body responses carry no headers at
//! all: their wire form is just the status line followed by the blank
//! line.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{Response, SendError};

/// Initial buffer reservation for a serialized response head.
const INIT_RESPONSE_SIZE: usize = 256;

#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let status = response.status();
        let body = response.body();

        dst.reserve(INIT_RESPONSE_SIZE + body.len());
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.code(), status.reason())?;

        if !body.is_empty() {
            // header name kept lowercase, matching the historical wire
            // format of this endpoint
            write!(FastWrite(dst), "Content-Type: {}\r\n", mime::APPLICATION_JSON)?;
            write!(FastWrite(dst), "content-length: {}\r\n", body.len())?;
        }

        dst.put_slice(b"\r\n");
        dst.put_slice(body);
        Ok(())
    }
}

/// `io::Write` adapter so `write!` can format straight into the
/// reserved `BytesMut`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;
    use bytes::Bytes;

    fn encode(response: Response) -> BytesMut {
        let mut buffer = BytesMut::new();
        ResponseEncoder::new().encode(response, &mut buffer).unwrap();
        buffer
    }

    #[test]
    fn not_found_is_a_bare_status_line() {
        let buffer = encode(Response::empty(Status::NotFound));
        assert_eq!(&buffer[..], b"HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[test]
    fn empty_ok_carries_no_headers() {
        let buffer = encode(Response::empty(Status::Ok));
        assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn body_gets_json_content_type_and_length() {
        let buffer = encode(Response::with_body(Status::Ok, Bytes::from_static(b"{\"id\":42}")));
        assert_eq!(
            &buffer[..],
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\ncontent-length: 9\r\n\r\n{\"id\":42}" as &[u8]
        );
    }

    #[test]
    fn too_large_uses_the_legacy_reason_phrase() {
        let buffer = encode(Response::empty(Status::PayloadTooLarge));
        assert_eq!(&buffer[..], b"HTTP/1.1 413 Request Entity Too Large\r\n\r\n");
    }
}
