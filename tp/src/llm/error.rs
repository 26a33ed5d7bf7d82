//! AI gateway error types

use thiserror::Error;

/// Errors from one gateway call
#[derive(Debug, Error)]
pub enum LlmError {
    /// The endpoint answered with a non-success status; body kept as
    /// opaque diagnostic text
    #[error("AI service error {status}: {body}")]
    Service { status: u16, body: String },

    /// Network/connectivity failure before a response arrived
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint replied 2xx but the payload was not a usable
    /// chat-completion shape
    #[error("malformed AI response: {0}")]
    Malformed(String),

    /// No endpoint/key configured; callers usually fall back instead of
    /// surfacing this
    #[error("AI endpoint is not configured")]
    NotConfigured,
}

impl LlmError {
    /// HTTP status for service errors, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = LlmError::Service {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(LlmError::NotConfigured.status(), None);
    }

    #[test]
    fn test_display_includes_body() {
        let err = LlmError::Service {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "AI service error 500: boom");
    }
}
