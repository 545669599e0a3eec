// Session Module
// Request-scoped key-value state identified by a session cookie

pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use store::{InMemorySessionStore, SessionStore};

/// User session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub session_id: String,

    /// Session creation time (Unix timestamp)
    pub created_at: i64,

    /// Last activity time (Unix timestamp)
    pub last_activity: i64,

    /// Session data (flexible key-value store)
    data: HashMap<String, serde_json::Value>,

    /// Set by every write; the request layer persists modified sessions
    #[serde(skip)]
    modified: bool,
}

impl Session {
    pub fn new(session_id: String) -> Self {
        let now = chrono::Utc::now().timestamp();

        Self {
            session_id,
            created_at: now,
            last_activity: now,
            data: HashMap::new(),
            modified: false,
        }
    }

    /// Create a session with a fresh random identifier
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
        self.modified = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag once the session has been stored
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn update_activity(&mut self) {
        self.last_activity = chrono::Utc::now().timestamp();
    }

    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp(), timeout_secs)
    }

    pub fn is_expired_at(&self, now: i64, timeout_secs: u64) -> bool {
        let idle = now.saturating_sub(self.last_activity);
        idle > 0 && idle as u64 > timeout_secs
    }
}

/// Spawn the background task removing idle sessions
pub fn spawn_sweeper(
    store: Arc<dyn SessionStore>,
    every: Duration,
    timeout_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), timeout_secs, "Starting session sweeper");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match store.sweep_expired(timeout_secs).await {
                        Ok(0) => {}
                        Ok(removed) => debug!(removed, "Expired sessions swept"),
                        Err(e) => warn!(error = %e, "Session sweep failed"),
                    }
                }
                _ = crate::signals::triggered(&mut shutdown) => {
                    info!("Session sweeper stopped");
                    break;
                }
            }
        }
    })
}
