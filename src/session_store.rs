//! In-memory booking session store using moka
//!
//! Each session sits behind its own lock; nothing is shared between
//! sessions. Abandoned sessions expire on their own.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::debug;
use uuid::Uuid;

use crate::booking::BookingSession;
use crate::error::AppError;

pub type SharedSession = Arc<Mutex<BookingSession>>;

/// Open booking sessions by id
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, SharedSession>,
}

impl SessionStore {
    /// Create a store with the configured limits
    pub fn new() -> Self {
        Self {
            // 10k sessions, 2 hour TTL, 30 min idle
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(2 * 60 * 60))
                .time_to_idle(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    pub async fn insert(&self, session: BookingSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id, shared.clone()).await;
        shared
    }

    /// Look up a session, `AppError::NotFound` when unknown or expired
    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions.get(&id).await.ok_or(AppError::NotFound)
    }

    /// Get store statistics for monitoring
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sessions: self.sessions.entry_count(),
        }
    }

    /// Apply pending expirations now
    pub async fn sweep(&self) {
        self.sessions.run_pending_tasks().await;
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub sessions: u64,
}

/// Expire abandoned sessions every 5 minutes
pub async fn start_session_sweeper(store: SessionStore) {
    let mut interval = interval(Duration::from_secs(5 * 60));
    loop {
        interval.tick().await;
        store.sweep().await;
        debug!("Session sweep complete. Stats: {:?}", store.stats());
    }
}
