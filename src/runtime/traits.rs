//! Trait abstractions for runtime I/O
//!
//! The executor only sees sessions through `SessionStore`, so tests can swap
//! in failing or recording stores.

use crate::journey::{Session, Step};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage for per-user sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored session, or a fresh one when the user is unknown.
    /// A fresh session is not stored until `save`.
    async fn get_or_create(&self, user_id: &str) -> Result<Session, String>;

    async fn get(&self, user_id: &str) -> Result<Option<Session>, String>;

    async fn save(&self, user_id: &str, session: &Session) -> Result<(), String>;

    /// Drop every session, returning how many there were
    async fn clear_all(&self) -> Result<usize, String>;

    async fn user_count(&self) -> Result<usize, String>;

    /// Number of sessions currently at each step
    async fn step_counts(&self) -> Result<BTreeMap<Step, usize>, String>;
}

// ============================================================================
// Arc implementation for shared stores
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get_or_create(&self, user_id: &str) -> Result<Session, String> {
        (**self).get_or_create(user_id).await
    }

    async fn get(&self, user_id: &str) -> Result<Option<Session>, String> {
        (**self).get(user_id).await
    }

    async fn save(&self, user_id: &str, session: &Session) -> Result<(), String> {
        (**self).save(user_id, session).await
    }

    async fn clear_all(&self) -> Result<usize, String> {
        (**self).clear_all().await
    }

    async fn user_count(&self) -> Result<usize, String> {
        (**self).user_count().await
    }

    async fn step_counts(&self) -> Result<BTreeMap<Step, usize>, String> {
        (**self).step_counts().await
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-lifetime session map. Everything is lost on restart.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    default_name: String,
}

impl InMemorySessionStore {
    /// `default_name` is the customer name given to every new session
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_name: default_name.into(),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, user_id: &str) -> Result<Session, String> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Session::new(self.default_name.clone())))
    }

    async fn get(&self, user_id: &str) -> Result<Option<Session>, String> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, session: &Session) -> Result<(), String> {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session.clone());
        Ok(())
    }

    async fn clear_all(&self) -> Result<usize, String> {
        let mut sessions = self.sessions.write().await;
        let cleared = sessions.len();
        sessions.clear();
        Ok(cleared)
    }

    async fn user_count(&self) -> Result<usize, String> {
        Ok(self.sessions.read().await.len())
    }

    async fn step_counts(&self) -> Result<BTreeMap<Step, usize>, String> {
        let sessions = self.sessions.read().await;
        let mut counts = BTreeMap::new();
        for session in sessions.values() {
            *counts.entry(session.step).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
