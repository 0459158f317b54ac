//! Request-line parsing.
//!
//! The server distinguishes exactly two methods and a single protocol
//! version; everything else is answered with a fixed status. The request
//! line is therefore split into plain tokens rather than parsed into a
//! full request structure.

/// The methods the connection state machine distinguishes.
///
/// Every token other than `POST` and `HEAD` leads to the same 501
/// response, so all of them collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Head,
    Other,
}

impl Method {
    /// Maps a raw request-line token to a method. Case-sensitive, as the
    /// method token is defined to be.
    pub fn from_token(token: &str) -> Self {
        match token {
            "POST" => Method::Post,
            "HEAD" => Method::Head,
            _ => Method::Other,
        }
    }
}

/// The three tokens of a request line.
///
/// The target is kept for logging only; the server exposes a single
/// resource and never routes on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: String,
}

impl RequestLine {
    /// Splits a raw request line (without the trailing CRLF) into its
    /// whitespace-separated tokens.
    ///
    /// Missing tokens become empty strings, which fail the later method
    /// and version checks without a dedicated error path.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let mut tokens = text.split_ascii_whitespace();

        let method = Method::from_token(tokens.next().unwrap_or(""));
        let target = tokens.next().unwrap_or("").to_owned();
        let version = tokens.next().unwrap_or("").to_owned();

        Self { method, target, version }
    }

    /// Whether the version token is literally `HTTP/1.1`.
    pub fn is_http11(&self) -> bool {
        self.version == "HTTP/1.1"
    }
}
