//! Error types
//!
//! Every fallible operation in the SDK returns [`Result`]. Errors raised
//! before a request leaves the process are [`Error::InvalidRequest`];
//! everything else reflects what the server or the transport reported.

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum Error {
    /// The request was rejected locally and never sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered 404
    #[error("resource not found: {url}")]
    ResourceNotFound { url: String, body: String },

    /// The server answered with any other non-success status
    #[error("HTTP {status} from {url}")]
    HttpException {
        status: u16,
        url: String,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidRequest(msg.into())
    }

    /// HTTP status carried by the error, if the server produced it
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ResourceNotFound { .. } => Some(404),
            Error::HttpException { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is a 404 from the server
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ResourceNotFound { .. })
    }
}

/// SDK result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_server_errors() {
        let not_found = Error::ResourceNotFound {
            url: "http://x/servers/s1/shares/sh1".to_string(),
            body: String::new(),
        };
        assert_eq!(not_found.status(), Some(404));
        assert!(not_found.is_not_found());

        let conflict = Error::HttpException {
            status: 409,
            url: "http://x".to_string(),
            body: "conflict".to_string(),
        };
        assert_eq!(conflict.status(), Some(409));
        assert!(!conflict.is_not_found());

        assert_eq!(Error::invalid("nope").status(), None);
    }
}
