//! Encoding and decoding for the single-shot exchange.
//!
//! - [`RequestDecoder`]: two-phase streaming decoder for the inbound
//!   request (request line, then head/body split)
//! - [`ResponseEncoder`]: serializes a response into one contiguous
//!   write
//!
//! Both sides plug into `tokio_util`'s framing, which drives `decode`
//! with the accumulated read buffer and flushes whatever `encode`
//! produced.

mod request_decoder;
pub use request_decoder::MAX_HEAD_BYTES;
pub use request_decoder::RequestDecoder;

mod response_encoder;
pub use response_encoder::ResponseEncoder;
