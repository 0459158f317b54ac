use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, trace, warn};

use crate::codec::{MAX_HEAD_BYTES, RequestDecoder, ResponseEncoder};
use crate::protocol::{HttpError, Method, ParseError, PayloadPrefix, RequestPart, Response, Status};

/// Handles one accepted connection end-to-end: read the request, decide
/// the status, write the response, shut the stream down.
///
/// The task driving [`process`](Self::process) is the connection's sole
/// owner; when it returns, every resource is released. A single
/// connection's steps are strictly sequential, so no internal locking
/// exists, and no state is shared between connections.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), MAX_HEAD_BYTES),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Runs the connection to its terminal state.
    ///
    /// Exactly one response is written, unless a fatal transport error
    /// preceded every status decision, in which case the peer observes only
    /// closed connection. Status decisions, in order:
    ///
    /// - head bytes exceed the cap before a delimiter: 413
    /// - `HEAD`: 200 with empty body, nothing further is read
    /// - any method other than `POST`: 501
    /// - version not literally `HTTP/1.1`: 505
    /// - declared content length of zero (or absent): dispatch of the
    ///   empty body, 404
    /// - otherwise the body is completed to exactly the declared length
    ///   and dispatched: 200, echoed back as JSON
    pub async fn process(mut self) -> Result<(), HttpError> {
        let (line, content_length) = match self.framed_read.next().await {
            Some(Ok(RequestPart::Line { line, content_length })) => (line, content_length),
            Some(Ok(RequestPart::Payload(_))) => {
                error!("need request line while receive body");
                return Err(ParseError::invalid_body("need request line while receive body").into());
            }
            Some(Err(e @ ParseError::TooLargeHeader { .. })) => {
                warn!(cause = %e, "request line delimiter not found");
                return self.respond(Response::empty(Status::PayloadTooLarge)).await;
            }
            Some(Err(e)) => {
                debug!(cause = %e, "transport error while reading request line");
                return Err(e.into());
            }
            None => {
                trace!("peer closed before sending a request");
                return Ok(());
            }
        };

        trace!(method = ?line.method, target = %line.target, "received request line");

        // HEAD doubles as a cheap liveness probe.
        if line.method == Method::Head {
            return self.respond(Response::empty(Status::Ok)).await;
        }
        if line.method != Method::Post {
            return self.respond(Response::empty(Status::NotImplemented)).await;
        }
        if !line.is_http11() {
            return self.respond(Response::empty(Status::VersionNotSupported)).await;
        }
        if content_length == 0 {
            // Nothing declared means nothing left to read: dispatch the
            // empty body right away instead of waiting for a head that
            // may never arrive.
            return self.respond(dispatch(Bytes::new())).await;
        }

        let prefix = match self.framed_read.next().await {
            Some(Ok(RequestPart::Payload(prefix))) => prefix,
            Some(Ok(RequestPart::Line { .. })) => {
                error!("need body while receive request line");
                return Err(ParseError::invalid_body("need body while receive request line").into());
            }
            Some(Err(e @ ParseError::TooLargeHeader { .. })) => {
                warn!(cause = %e, "header delimiter not found");
                return self.respond(Response::empty(Status::PayloadTooLarge)).await;
            }
            Some(Err(e)) => {
                debug!(cause = %e, "transport error while reading headers");
                return Err(e.into());
            }
            None => {
                trace!("peer closed before completing the head");
                return Ok(());
            }
        };

        let body = self.complete_body(prefix).await?;
        self.respond(dispatch(body)).await
    }

    /// Tops the buffered body prefix up to the declared length with a
    /// single bounded read of exactly the missing bytes.
    ///
    /// Response assembly never starts before this returns, so a
    /// dispatched body always has exactly the declared length.
    async fn complete_body(&mut self, prefix: PayloadPrefix) -> Result<Bytes, HttpError> {
        let PayloadPrefix { chunk, shortfall } = prefix;
        if shortfall == 0 {
            return Ok(chunk);
        }

        trace!(shortfall, "topping up under-read body");
        let declared = chunk.len() + shortfall as usize;
        let mut body = BytesMut::with_capacity(declared);
        body.extend_from_slice(&chunk);
        body.resize(declared, 0);

        self.framed_read.get_mut().read_exact(&mut body[chunk.len()..]).await.map_err(ParseError::io)?;
        Ok(body.freeze())
    }

    /// Writes the response and tears the connection down.
    ///
    /// A failed send is logged but not propagated: the status decision
    /// has been made and the connection is terminal either way, which
    /// keeps the exchange at exactly one response, never two.
    async fn respond(&mut self, response: Response) -> Result<(), HttpError> {
        let code = response.status().code();
        if let Err(e) = self.framed_write.send(response).await {
            warn!(cause = %e, "can't send response");
        }
        if let Err(e) = self.framed_write.get_mut().shutdown().await {
            trace!(cause = %e, "shutdown after response failed");
        }
        debug!(code, "connection finished");
        Ok(())
    }
}

/// The single-resource dispatch decision: an empty body means there is
/// nothing to serve, anything else is echoed back as JSON.
fn dispatch(body: Bytes) -> Response {
    if body.is_empty() {
        Response::empty(Status::NotFound)
    } else {
        Response::with_body(Status::Ok, body)
    }
}
