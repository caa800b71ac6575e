use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Wire codes shared by the REST service, the store client and the
/// controllers. Domain errors carry one of these; everything else is
/// reported as `SERVER_ERROR` with a generic message.
pub mod codes {
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SYNTAX: &str = "SYNTAX";
    pub const CIRCULAR_REF: &str = "CIRCULAR_REF";
    pub const DB: &str = "DB";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("formula syntax error: {0}")]
    Syntax(String),

    #[error("circular reference: {0}")]
    Circular(String),

    #[error("store backend error: {0}")]
    Backend(String),

    /// Structured error returned by a remote store service, re-surfaced
    /// unchanged so callers can branch on `error.code`.
    #[error("{}: {}", .0.error.code, .0.error.message)]
    Remote(ErrorEnvelope),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl StoreError {
    /// True for errors that carry a wire code of their own; transport
    /// failures are not domain errors and map to `SERVER_ERROR`.
    pub fn is_domain(&self) -> bool {
        !matches!(self, StoreError::Transport(_))
    }

    /// Wire message: the error detail without the variant prefix that
    /// `Display` adds.
    pub fn message(&self) -> String {
        match self {
            StoreError::BadRequest(m)
            | StoreError::NotFound(m)
            | StoreError::Syntax(m)
            | StoreError::Circular(m)
            | StoreError::Backend(m) => m.clone(),
            StoreError::Remote(envelope) => envelope.error.message.clone(),
            StoreError::Transport(e) => e.to_string(),
        }
    }

    /// Wire code for this error.
    pub fn code(&self) -> &str {
        match self {
            StoreError::BadRequest(_) => codes::BAD_REQUEST,
            StoreError::NotFound(_) => codes::NOT_FOUND,
            StoreError::Syntax(_) => codes::SYNTAX,
            StoreError::Circular(_) => codes::CIRCULAR_REF,
            StoreError::Backend(_) => codes::DB,
            StoreError::Remote(envelope) => &envelope.error.code,
            StoreError::Transport(_) => codes::SERVER_ERROR,
        }
    }
}

/// JSON error shape shared by every REST error response:
/// `{status: <int>, error: {code: <string>, message: <string>}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
