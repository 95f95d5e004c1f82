//! Session context — the explicit session handle passed to every tool call.
//!
//! The driver resolves which conversation a tool invocation belongs to and
//! hands the context down; no operation reads ambient process-wide state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Context for one tool invocation within an onboarding conversation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    /// The onboarding session this invocation operates on.
    pub session_id: Uuid,
    /// When the conversation started.
    pub started_at: DateTime<Utc>,
    /// Free-form driver metadata (channel, user agent, trace ids).
    pub metadata: serde_json::Value,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

impl SessionContext {
    /// Create a context bound to an existing session.
    pub fn for_session(session_id: Uuid) -> Self {
        Self {
            session_id,
            ..Default::default()
        }
    }
}
