//! Per-login session state.
//!
//! A session is created by a successful login, removed by logout, and treated
//! as gone once it expires. It carries the last fetch cycle so the dashboard
//! and report endpoints read that user's data and nobody else's.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;
use ytdash_analytics::FetchCycle;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_cycle: Option<Arc<FetchCycle>>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory session table shared by all handlers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a session for `email`. Expired sessions are swept first.
    pub async fn create(&self, email: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4(),
            email: email.to_string(),
            created_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            last_cycle: None,
        };

        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token, session.clone());
        session
    }

    /// Returns the live session for `token`, dropping it if it has expired.
    pub async fn get(&self, token: Uuid) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        if sessions.get(&token).is_some_and(|s| s.is_expired(now)) {
            sessions.remove(&token);
            return None;
        }
        sessions.get(&token).cloned()
    }

    /// Invalidates `token`. Returns whether a session was removed.
    pub async fn remove(&self, token: Uuid) -> bool {
        self.sessions.lock().await.remove(&token).is_some()
    }

    /// Replaces the session's last cycle wholesale. Returns `false` if the
    /// session no longer exists.
    pub async fn store_cycle(&self, token: Uuid, cycle: Arc<FetchCycle>) -> bool {
        match self.sessions.lock().await.get_mut(&token) {
            Some(session) => {
                session.last_cycle = Some(cycle);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ytdash_core::{DateWindow, ResultsTable};

    use super::*;

    fn empty_cycle() -> Arc<FetchCycle> {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Arc::new(FetchCycle {
            window: DateWindow::new(day, day).unwrap(),
            table: ResultsTable::default(),
            channels: Vec::new(),
            invalid_channels: Vec::new(),
            no_data: None,
            provider_calls: 0,
        })
    }

    #[tokio::test]
    async fn created_session_is_retrievable_until_logout() {
        let store = SessionStore::new(60);
        let session = store.create("a@example.com").await;

        let found = store.get(session.token).await.expect("session");
        assert_eq!(found.email, "a@example.com");
        assert!(found.last_cycle.is_none());

        assert!(store.remove(session.token).await);
        assert!(store.get(session.token).await.is_none());
        assert!(!store.remove(session.token).await);
    }

    #[tokio::test]
    async fn zero_ttl_sessions_expire_immediately() {
        let store = SessionStore::new(0);
        let session = store.create("a@example.com").await;
        assert!(store.get(session.token).await.is_none());
    }

    #[tokio::test]
    async fn cycles_are_scoped_to_one_session() {
        let store = SessionStore::new(60);
        let a = store.create("a@example.com").await;
        let b = store.create("b@example.com").await;

        assert!(store.store_cycle(a.token, empty_cycle()).await);
        assert!(store.get(a.token).await.unwrap().last_cycle.is_some());
        assert!(store.get(b.token).await.unwrap().last_cycle.is_none());
        assert!(!store.store_cycle(Uuid::new_v4(), empty_cycle()).await);
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let store = SessionStore::new(u64::MAX);
        assert_eq!(store.ttl, Duration::MAX);
    }
}
