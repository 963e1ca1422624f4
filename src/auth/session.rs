use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Principal;

/// Server-side state of one authenticated client
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session table keyed by session id. A missing or expired entry means Anonymous.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a session for `principal`, evicting any sessions that have expired.
    pub async fn create(&self, principal: Principal) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            principal,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn resolve(&self, id: Uuid) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().await.remove(&id);
        None
    }

    /// Returns whether a live session was removed.
    pub async fn invalidate(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn active_count(&self) -> usize {
        let now = Utc::now();
        self.sessions.read().await.values().filter(|s| !s.is_expired(now)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn principal() -> Principal {
        Principal::new("user1", [Role::User])
    }

    #[tokio::test]
    async fn created_session_resolves_until_invalidated() {
        let store = SessionStore::new(Duration::hours(1));
        let session = store.create(principal()).await;

        let resolved = store.resolve(session.id).await.unwrap();
        assert_eq!(resolved.principal, principal());

        assert!(store.invalidate(session.id).await);
        assert!(store.resolve(session.id).await.is_none());
        assert!(!store.invalidate(session.id).await);
    }

    #[tokio::test]
    async fn expired_session_is_anonymous_and_evicted() {
        let store = SessionStore::new(Duration::zero());
        let session = store.create(principal()).await;

        assert!(store.resolve(session.id).await.is_none());
        assert_eq!(store.active_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_session_is_anonymous() {
        let store = SessionStore::new(Duration::hours(1));
        assert!(store.resolve(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = SessionStore::new(Duration::hours(1));
        let a = store.create(principal()).await;
        let b = store.create(Principal::new("admin", [Role::User, Role::Admin])).await;

        store.invalidate(a.id).await;
        assert!(store.resolve(a.id).await.is_none());
        assert_eq!(store.resolve(b.id).await.unwrap().principal.username, "admin");
    }
}
