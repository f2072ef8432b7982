use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error returned by the tax authority after a successful
/// round-trip (`status: 0` responses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityError {
    /// Authority error code, when the response carried one.
    pub code: Option<String>,
    /// The authority's error message, verbatim.
    pub message: String,
}

impl std::fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not configured: {0}")]
    Config(String),

    #[error("Record store error: {0}")]
    Store(anyhow::Error),

    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    #[error("Authority rejected request: {0}")]
    Rejected(AuthorityError),

    #[error("Cryptographic failure: {0}")]
    Crypto(String),

    #[error("Service unavailable: {0}")]
    Unavailable(anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ComplianceError {
    /// Whether a bounded retry may succeed. Business-rule rejections and
    /// validation failures never retry; only transport-level failures do.
    pub fn is_transient(&self) -> bool {
        matches!(self, ComplianceError::Unavailable(_))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ComplianceError::Validation(msg.into())
    }

    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        ComplianceError::Store(err.into())
    }
}

impl From<validator::ValidationErrors> for ComplianceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ComplianceError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for ComplianceError {
    fn from(err: serde_json::Error) -> Self {
        ComplianceError::Internal(anyhow::Error::new(err))
    }
}
