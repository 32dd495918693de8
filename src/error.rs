use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for objstore-bridge
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for objstore-bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Network level failure while sending or receiving (DNS, refused connection, timeout)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// No backend registered under the requested name
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// A backend with this name is already registered
    #[error("backend already registered: {0}")]
    DuplicateBackend(String),

    /// The backend will never support this operation
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// Failure while buffering the request body, before anything was sent
    #[error("failed to read request body: {0}")]
    Read(#[from] std::io::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header name or value that cannot be put on the wire
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Signing strategy failure
    #[error("signing error: {0}")]
    Signing(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Error::NotSupported(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Backend(e) if e.status == StatusCode::NOT_FOUND)
    }

    /// Hint for a calling retry layer. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Backend(e) => e.retryable.unwrap_or_else(|| {
                e.status.is_server_error() || e.status == StatusCode::TOO_MANY_REQUESTS
            }),
            _ => false,
        }
    }
}

/// Structured error parsed from a non-success response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("status: {}, kind: {kind}, message: {message}", .status.as_u16())]
pub struct BackendError {
    pub status: StatusCode,
    pub kind: String,
    pub message: String,
    pub retryable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "code", alias = "error")]
    kind: Option<String>,
    #[serde(alias = "msg")]
    message: Option<String>,
    retryable: Option<bool>,
}

impl BackendError {
    /// Build from a status and the raw response body.
    ///
    /// JSON bodies of the form `{"kind": .., "message": .., "retryable": ..}`
    /// (with `code`/`error` and `msg` accepted as aliases) are parsed field by
    /// field. Anything else becomes the message verbatim, with the status
    /// reason phrase as the kind.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let reason = || {
            status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string()
        };

        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => BackendError {
                status,
                kind: parsed.kind.unwrap_or_else(reason),
                message: parsed.message.unwrap_or_default(),
                retryable: parsed.retryable,
            },
            Err(_) => BackendError {
                status,
                kind: reason(),
                message: String::from_utf8_lossy(body).trim().to_string(),
                retryable: None,
            },
        }
    }
}
