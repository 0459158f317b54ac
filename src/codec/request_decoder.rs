//! Streaming decoder for the inbound request.
//!
//! The decoder mirrors the connection's read sequence with a two-phase
//! state machine:
//!
//! 1. `Line`: hunt for the first CRLF, split the request line off, and
//!    scan whatever header bytes are already buffered for a declared
//!    content length.
//! 2. `Head`: hunt for the blank-line delimiter, cut the header block
//!    off exactly there, and yield the buffered body prefix together
//!    with the number of bytes the peer still owes.
//!
//! Each phase returns `Ok(None)` until its delimiter is buffered and
//! fails with [`ParseError::TooLargeHeader`] once the accumulated bytes
//! exceed the cap without a delimiter, the one recoverable transport
//! error, which the connection maps to 413.

use std::cmp;
use std::str;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadPrefix, RequestLine, RequestPart};

/// Cap on bytes buffered while hunting for a delimiter. Doubles as the
/// initial receive-buffer capacity.
pub const MAX_HEAD_BYTES: usize = 4 * 1024;

const CRLF: &[u8] = b"\r\n";
const CRLF_CRLF: &[u8] = b"\r\n\r\n";
const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length:";

#[derive(Debug)]
pub struct RequestDecoder {
    state: State,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Line,
    Head { content_length: u64 },
    Done,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { state: State::Line }
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestPart;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.state {
            State::Line => {
                let Some(pos) = find(src, CRLF) else {
                    ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
                    return Ok(None);
                };

                let line_bytes = src.split_to(pos + CRLF.len());
                let line = RequestLine::parse(&line_bytes[..pos]);
                let content_length = scan_content_length(src);
                trace!(content_length, "decoded request line");

                self.state = State::Head { content_length };
                Ok(Some(RequestPart::Line { line, content_length }))
            }

            State::Head { content_length } => {
                let Some(pos) = find(src, CRLF_CRLF) else {
                    ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
                    return Ok(None);
                };

                // Cut exactly at the blank line. The header block already
                // served its purpose during the line phase.
                let _ = src.split_to(pos + CRLF_CRLF.len());

                let available = cmp::min(content_length, src.len() as u64);
                let chunk = src.split_to(available as usize).freeze();
                let shortfall = content_length - chunk.len() as u64;
                trace!(buffered = chunk.len(), shortfall, "decoded body prefix");

                self.state = State::Done;
                Ok(Some(RequestPart::Payload(PayloadPrefix { chunk, shortfall })))
            }

            State::Done => Ok(None),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Scans buffered header bytes, line by line, for a literal
/// `Content-Length:` prefix and parses its decimal value.
///
/// The trailing partial line is scanned too, since the buffer usually
/// ends mid-head at this point. Absent or unparsable values fall back
/// to zero.
fn scan_content_length(buf: &[u8]) -> u64 {
    let mut rest = buf;
    loop {
        let (line, next) = match find(rest, CRLF) {
            Some(pos) => (&rest[..pos], &rest[pos + CRLF.len()..]),
            None => (rest, &[][..]),
        };

        if let Some(value) = line.strip_prefix(CONTENT_LENGTH_PREFIX) {
            return str::from_utf8(value).ok().and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(0);
        }

        if next.is_empty() {
            return 0;
        }
        rest = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Method;

    fn decode_line(decoder: &mut RequestDecoder, buffer: &mut BytesMut) -> (RequestLine, u64) {
        match decoder.decode(buffer) {
            Ok(Some(RequestPart::Line { line, content_length })) => (line, content_length),
            other => panic!("expected request line, got {other:?}"),
        }
    }

    fn decode_payload(decoder: &mut RequestDecoder, buffer: &mut BytesMut) -> PayloadPrefix {
        match decoder.decode(buffer) {
            Ok(Some(RequestPart::Payload(prefix))) => prefix,
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[test]
    fn full_request_in_one_buffer() {
        let mut buffer = BytesMut::from(&b"POST /ingest HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello"[..]);
        let mut decoder = RequestDecoder::new();

        let (line, content_length) = decode_line(&mut decoder, &mut buffer);
        assert_eq!(line.method, Method::Post);
        assert_eq!(line.target, "/ingest");
        assert!(line.is_http11());
        assert_eq!(content_length, 5);

        let prefix = decode_payload(&mut decoder, &mut buffer);
        assert_eq!(&prefix.chunk[..], b"hello");
        assert_eq!(prefix.shortfall, 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn waits_for_the_line_delimiter() {
        let mut buffer = BytesMut::from(&b"POST /ingest HT"[..]);
        let mut decoder = RequestDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"TP/1.1\r\n");
        let (line, content_length) = decode_line(&mut decoder, &mut buffer);
        assert!(line.is_http11());
        assert_eq!(content_length, 0);
    }

    #[test]
    fn scans_content_length_from_buffered_headers() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 12\r\nAccept: */*\r\n\r\n"[..]);
        let mut decoder = RequestDecoder::new();

        let (_, content_length) = decode_line(&mut decoder, &mut buffer);
        assert_eq!(content_length, 12);
    }

    #[test]
    fn content_length_on_a_partial_trailing_line() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 7"[..]);
        let mut decoder = RequestDecoder::new();

        let (_, content_length) = decode_line(&mut decoder, &mut buffer);
        assert_eq!(content_length, 7);
    }

    #[test]
    fn unparsable_content_length_falls_back_to_zero() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: many\r\n\r\n"[..]);
        let mut decoder = RequestDecoder::new();

        let (_, content_length) = decode_line(&mut decoder, &mut buffer);
        assert_eq!(content_length, 0);
    }

    #[test]
    fn absent_content_length_is_zero() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nHost: a\r\n\r\n"[..]);
        let mut decoder = RequestDecoder::new();

        let (_, content_length) = decode_line(&mut decoder, &mut buffer);
        assert_eq!(content_length, 0);
    }

    #[test]
    fn short_body_reports_the_shortfall() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 20\r\n\r\n012345678901"[..]);
        let mut decoder = RequestDecoder::new();

        let (_, content_length) = decode_line(&mut decoder, &mut buffer);
        assert_eq!(content_length, 20);

        let prefix = decode_payload(&mut decoder, &mut buffer);
        assert_eq!(&prefix.chunk[..], b"012345678901");
        assert_eq!(prefix.shortfall, 8);
    }

    #[test]
    fn body_is_cut_exactly_at_the_declared_length() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nabcdEXTRA"[..]);
        let mut decoder = RequestDecoder::new();

        let _ = decode_line(&mut decoder, &mut buffer);
        let prefix = decode_payload(&mut decoder, &mut buffer);
        assert_eq!(&prefix.chunk[..], b"abcd");
        assert_eq!(prefix.shortfall, 0);
        assert_eq!(&buffer[..], b"EXTRA");
    }

    #[test]
    fn oversized_line_fails_with_too_large_header() {
        let mut buffer = BytesMut::from(&vec![b'a'; MAX_HEAD_BYTES + 1][..]);
        let mut decoder = RequestDecoder::new();

        let error = decoder.decode(&mut buffer).unwrap_err();
        assert!(matches!(error, ParseError::TooLargeHeader { .. }));
    }

    #[test]
    fn oversized_head_fails_with_too_large_header() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\n"[..]);
        buffer.extend_from_slice(&vec![b'h'; MAX_HEAD_BYTES + 1]);
        let mut decoder = RequestDecoder::new();

        let _ = decode_line(&mut decoder, &mut buffer);
        let error = decoder.decode(&mut buffer).unwrap_err();
        assert!(matches!(error, ParseError::TooLargeHeader { .. }));
    }
}
