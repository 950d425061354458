//! Error types for the LLM client.

use std::fmt;

/// Coarse classification of an LLM failure, used by the quest generator
/// to record why it fell back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection failure, timeout, or other transport problem.
    Network,
    /// The backend returned a non-success HTTP status.
    Api,
    /// The backend responded, but the body could not be understood.
    Parse,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmErrorKind::Network => write!(f, "network error"),
            LlmErrorKind::Api => write!(f, "api error"),
            LlmErrorKind::Parse => write!(f, "parse error"),
        }
    }
}

/// An error from the text-generation backend.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Api,
            message: format!("status {}: {}", status, message.into()),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Parse,
            message: message.into(),
        }
    }
}
