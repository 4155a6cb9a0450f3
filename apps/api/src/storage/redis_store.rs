use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::storage::SnapshotStore;

/// Stores the snapshot as a single Redis string value.
pub struct RedisSnapshotStore {
    client: redis::Client,
    key: String,
}

impl RedisSnapshotStore {
    pub fn new(client: redis::Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let payload: Option<Vec<u8>> = conn
            .get(&self.key)
            .await
            .with_context(|| format!("GET {} failed", self.key))?;
        Ok(payload)
    }

    async fn save(&self, payload: Vec<u8>) -> Result<()> {
        let mut conn = self.connection().await?;
        let len = payload.len();
        conn.set::<_, _, ()>(&self.key, payload)
            .await
            .with_context(|| format!("SET {} failed", self.key))?;
        debug!("Saved {len} byte snapshot to redis key {}", self.key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(&self.key)
            .await
            .with_context(|| format!("DEL {} failed", self.key))?;
        Ok(())
    }
}
