//! Protocol types for the single-shot request/response exchange.
//!
//! This module provides the building blocks the codec and connection
//! layers share:
//!
//! - **Request parsing** ([`request`]): [`RequestLine`] and [`Method`],
//!   the tokens the state machine branches on
//! - **Stream items** ([`message`]): [`RequestPart`] and
//!   [`PayloadPrefix`], the pieces the request decoder yields
//! - **Responses** ([`response`], [`status`]): [`Response`] over the
//!   exhaustive [`Status`] enum
//! - **Errors** ([`error`]): [`HttpError`], [`ParseError`] and
//!   [`SendError`]
//!
//! The design keeps each connection self-contained: every type here is
//! owned by a single connection task, so nothing carries locks or
//! shared state.

mod message;
pub use message::PayloadPrefix;
pub use message::RequestPart;

mod request;
pub use request::Method;
pub use request::RequestLine;

mod response;
pub use response::Response;

mod status;
pub use status::Status;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
