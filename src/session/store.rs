//! In-memory session store.
//!
//! Sessions are independent and may run in parallel; actions on one
//! session are serialized by a per-session lock so each mutation observes
//! a consistent record. Nothing survives a process restart.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::SessionError;

use super::model::OnboardingSession;

/// Handle to one session: the record behind its serialization lock.
pub type SessionHandle = Arc<Mutex<OnboardingSession>>;

/// Store of live onboarding sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session and return its id.
    pub async fn create(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(OnboardingSession::new(session_id)));
        self.sessions.write().await.insert(session_id, session);
        tracing::debug!(%session_id, "Created onboarding session");
        session_id
    }

    /// Get the handle for a session.
    pub async fn get(&self, session_id: Uuid) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(SessionError::NotFound(session_id))
    }

    /// Get the handle for a session, creating the record if it does not
    /// exist yet. Lets the driver start a conversation without a separate
    /// create call.
    pub async fn get_or_create(&self, session_id: Uuid) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(&session_id) {
            return handle.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id)
            .or_insert_with(|| {
                tracing::debug!(%session_id, "Created onboarding session");
                Arc::new(Mutex::new(OnboardingSession::new(session_id)))
            })
            .clone()
    }

    /// Drop a session when its conversation ends.
    pub async fn remove(&self, session_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&session_id).is_some();
        if removed {
            tracing::debug!(%session_id, "Removed onboarding session");
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
