//! Error types for the API client.

use crate::types::ResponseCode;

/// Where a redirect-classified response sends the user.
///
/// The server never resolves `unauthorized` / `not_found` / `forbidden`
/// envelopes into data; the client surfaces them as a typed
/// [`Error::Redirected`] so no call site is left waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Login route, optionally carrying the path to return to after login.
    Login { redirect: Option<String> },
    NotFound,
    Forbidden,
}

impl std::fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedirectTarget::Login { .. } => write!(f, "login"),
            RedirectTarget::NotFound => write!(f, "not-found"),
            RedirectTarget::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No response within the fixed timeout window. Not retried automatically.
    #[error("request timed out")]
    Timeout,
    /// Connection refused, DNS failure, aborted stream.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The response body was not a valid envelope, or event data re-typing failed.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    /// A non-2xx status with a body snippet, before any envelope was read.
    #[error("request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A `fail` / `validate_error` / unknown envelope, carrying the server's message.
    #[error("{message}")]
    Api {
        code: ResponseCode,
        message: String,
    },
    /// The envelope classified into a navigation, not a value.
    #[error("redirected to {0}")]
    Redirected(RedirectTarget),
    /// The event stream could not be decoded. Terminal for the whole stream.
    #[error("stream decode error: {0}")]
    Decode(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
