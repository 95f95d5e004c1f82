//! The `Tool` trait and its supporting types.
//!
//! A tool is a named, typed, validated operation the external driver may
//! invoke. Every failure renders as plain text the driver can relay
//! conversationally.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::SessionContext;

/// Tool definition handed to the driver for function calling.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the parameters object.
    pub parameters: serde_json::Value,
}

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Malformed or unusable input — recoverable; the driver should
    /// re-prompt the user and call the same tool again.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A dependency was unreachable or timed out — the driver may retry
    /// later or continue the conversation without this result.
    #[error("Temporarily unavailable: {0}")]
    Retryable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    /// Plain-text form for the driver to relay to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Structured result of a successful tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub result: serde_json::Value,
    pub duration_ms: u128,
}

impl ToolOutput {
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self {
            result,
            duration_ms: duration.as_millis(),
        }
    }

    pub fn text(content: impl Into<String>, duration: Duration) -> Self {
        Self::success(serde_json::json!({ "text": content.into() }), duration)
    }
}

/// A named, typed operation the driver can dispatch to.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the parameters object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// Extract a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing required parameter '{key}'")))
}

/// Extract an optional string parameter.
pub fn optional_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// Extract a required array-of-strings parameter.
pub fn require_str_array(params: &serde_json::Value, key: &str) -> Result<Vec<String>, ToolError> {
    let array = params.get(key).and_then(|v| v.as_array()).ok_or_else(|| {
        ToolError::InvalidParameters(format!("missing required array parameter '{key}'"))
    })?;
    array
        .iter()
        .map(|v| {
            v.as_str().map(String::from).ok_or_else(|| {
                ToolError::InvalidParameters(format!("'{key}' entries must be strings"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_accepts_present_key() {
        let params = serde_json::json!({"name": "Acme"});
        assert_eq!(require_str(&params, "name").unwrap(), "Acme");
    }

    #[test]
    fn require_str_rejects_missing_or_wrong_type() {
        let params = serde_json::json!({"count": 3});
        assert!(require_str(&params, "name").is_err());
        assert!(require_str(&params, "count").is_err());
    }

    #[test]
    fn require_str_array_collects_strings() {
        let params = serde_json::json!({"items": ["a", "b"]});
        assert_eq!(
            require_str_array(&params, "items").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn require_str_array_rejects_mixed_types() {
        let params = serde_json::json!({"items": ["a", 1]});
        assert!(require_str_array(&params, "items").is_err());
    }

    #[test]
    fn tool_error_renders_as_plain_text() {
        let err = ToolError::InvalidParameters("company_name must not be blank".to_string());
        assert!(err.user_message().contains("company_name"));
    }
}
