//! Error types for Vendor Assist.
//!
//! Each subsystem carries its own enum; they cross the tool boundary as
//! `ActionError`/`ToolError`, so there is no crate-wide rollup.

use std::time::Duration;

use uuid::Uuid;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Session and workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Internal invariant breach — not reachable through the public
    /// action set. Logged at the call site, never shown to the user.
    #[error("State violation: {0}")]
    StateViolation(String),
}

/// Retrieval-path errors: embedding backend and query handling.
///
/// `NoMatches` is deliberately absent — an index miss is an empty result,
/// not an error.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Embedding backend request failed: {0}")]
    Backend(String),

    #[error("Embedding backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("Embedding backend failed after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

impl RetrievalError {
    /// Whether the driver may retry this call later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Backend(_) | Self::Timeout(_) | Self::RetriesExhausted { .. }
        )
    }
}

/// Embedding index errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(
        "Embedding model mismatch in namespace {namespace}: index uses {expected}, got {actual}"
    )]
    ModelMismatch {
        namespace: String,
        expected: String,
        actual: String,
    },

    #[error("Dimension mismatch in namespace {namespace}: index holds {expected}, got {actual}")]
    DimensionMismatch {
        namespace: String,
        expected: usize,
        actual: usize,
    },

    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_names_the_variable() {
        let err = ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: OPENAI_API_KEY"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(RetrievalError::Backend("down".to_string()).is_retryable());
        assert!(RetrievalError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!RetrievalError::InvalidQuery("blank".to_string()).is_retryable());
        assert!(
            !RetrievalError::Index(IndexError::DegenerateVector("zero".to_string()))
                .is_retryable()
        );
    }
}
