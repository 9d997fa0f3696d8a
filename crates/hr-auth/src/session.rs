//! Server-side sessions
//!
//! A login creates a session; its id travels in the token as `sid`.
//! Logging out or deleting a user revokes the session, which kills the
//! token before its expiry.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hr_core::traits::Id;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: Id,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Id, lifetime_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(lifetime_seconds),
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Concurrent in-process session table
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, user_id: Id, lifetime_seconds: i64) -> Session {
        let session = Session::new(user_id, lifetime_seconds);
        self.sessions.insert(session.id.clone(), session.clone());
        tracing::debug!(user_id = %user_id, "session created");
        session
    }

    /// Unexpired session owned by `user_id`
    pub fn is_active(&self, session_id: &str, user_id: Id) -> bool {
        self.sessions
            .get(session_id)
            .map_or(false, |s| s.user_id == user_id && s.is_valid())
    }

    pub fn revoke(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drop every session of a user; returns how many were removed
    pub fn revoke_user(&self, user_id: Id) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.user_id != user_id);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(user_id = %user_id, removed, "user sessions revoked");
        }
        removed
    }

    pub fn cleanup_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.is_valid());
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_revoke() {
        let store = SessionStore::new();
        let user = Uuid::new_v4();
        let session = store.create(user, 3600);

        assert!(store.is_active(&session.id, user));
        assert!(!store.is_active(&session.id, Uuid::new_v4()));
        assert!(store.revoke(&session.id));
        assert!(!store.is_active(&session.id, user));
        assert!(!store.revoke(&session.id));
    }

    #[test]
    fn test_revoke_user_keeps_others() {
        let store = SessionStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.create(alice, 3600);
        store.create(alice, 3600);
        let kept = store.create(bob, 3600);

        assert_eq!(store.revoke_user(alice), 2);
        assert_eq!(store.len(), 1);
        assert!(store.is_active(&kept.id, bob));
    }

    #[test]
    fn test_expired_sessions() {
        let store = SessionStore::new();
        let user = Uuid::new_v4();
        let expired = store.create(user, -1);
        store.create(user, 3600);

        assert!(!store.is_active(&expired.id, user));
        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
    }
}
