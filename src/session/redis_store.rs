//! Redis-backed session store

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use super::{store::SessionStore, SessionData};
use crate::error::{AppError, AppResult};

const KEY_PREFIX: &str = "bookshelf:session:";

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to Redis and check the connection
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { conn })
    }

    fn key(id: &str) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))?;

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    // Unreadable entries are treated as absent; the next save replaces them
                    tracing::warn!("Discarding undecodable session entry: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, id: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.conn.clone();

        let raw = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize session: {}", e)))?;

        conn.set_ex::<_, _, ()>(Self::key(id), raw, ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store session in Redis: {}", e)))?;

        Ok(())
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(Self::key(id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete session from Redis: {}", e)))?;

        Ok(())
    }
}
