//! Session storage backends

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use super::SessionData;
use crate::error::AppResult;

/// Persistence for server-side session data, keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session, `None` when unknown or expired
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>>;

    /// Save a session, resetting its time to live
    async fn save(&self, id: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()>;

    async fn remove(&self, id: &str) -> AppResult<()>;
}

/// Expired sessions are swept from [`MemoryStore`] once every this many saves
const SWEEP_EVERY: usize = 256;

/// Process-local store for development and tests
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, (SessionData, Instant)>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included until they are next touched
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some((data, expires_at)) if *expires_at > now => return Ok(Some(data.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        self.sessions.write().await.remove(id);
        Ok(None)
    }

    async fn save(&self, id: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if (self.saves.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            let before = sessions.len();
            sessions.retain(|_, (_, expires_at)| *expires_at > now);
            tracing::debug!(swept = before - sessions.len(), "Swept expired sessions");
        }

        let expires_at = now + Duration::from_secs(ttl_seconds);
        sessions.insert(id.to_string(), (data.clone(), expires_at));
        Ok(())
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
