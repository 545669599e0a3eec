// Session storage backends

use super::Session;
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument};

/// Durable session storage
///
/// Writes replace the whole session; concurrent requests on the same
/// session are not coordinated and the last writer wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<Session>>;

    async fn save(&self, session: &Session) -> Result<()>;

    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Remove sessions idle for longer than `timeout_secs`, returning how many
    async fn sweep_expired(&self, timeout_secs: u64) -> Result<usize>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Test convenience
    pub fn insert_direct(&self, session: Session) {
        self.sessions.insert(session.session_id.clone(), session);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(session_id).map(|s| s.clone()))
    }

    #[instrument(skip(self, session), fields(session_id = %session.session_id))]
    async fn save(&self, session: &Session) -> Result<()> {
        let mut stored = session.clone();
        stored.mark_saved();
        self.sessions.insert(stored.session_id.clone(), stored);
        debug!("Session saved");
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.remove(session_id);
        Ok(())
    }

    async fn sweep_expired(&self, timeout_secs: u64) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.is_expired_at(now, timeout_secs));
        Ok(before.saturating_sub(self.sessions.len()))
    }
}
