//! Authenticated-user session.
//!
//! Either fully present (a signed-in user record) or fully absent — there
//! is no intermediate state visible to handlers, and the session is always
//! replaced wholesale, never patched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

/// An active preview session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user record, as stored in the user table.
    pub user: Value,
}

/// Owning container for the session.
#[derive(Clone)]
pub struct SessionState {
    session: Arc<RwLock<Option<Session>>>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Clone the current session, if any.
    pub async fn snapshot(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// The signed-in user record, if any.
    pub async fn user(&self) -> Option<Value> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Replace the session with a freshly signed-in user.
    pub async fn sign_in(&self, user: Value) {
        *self.session.write().await = Some(Session { user });
    }

    /// Drop the session.
    pub async fn clear(&self) {
        *self.session.write().await = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn starts_unauthenticated() {
        let session = SessionState::new();
        assert!(!session.is_authenticated().await);
        assert!(session.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn sign_in_then_clear() {
        let session = SessionState::new();
        session.sign_in(json!({"id": "u1", "email": "a@b.c"})).await;
        assert!(session.is_authenticated().await);
        assert_eq!(session.user().await, Some(json!({"id": "u1", "email": "a@b.c"})));

        session.clear().await;
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn sign_in_replaces_wholesale() {
        let session = SessionState::new();
        session.sign_in(json!({"id": "u1"})).await;
        session.sign_in(json!({"id": "u2"})).await;
        assert_eq!(session.user().await, Some(json!({"id": "u2"})));
    }
}
