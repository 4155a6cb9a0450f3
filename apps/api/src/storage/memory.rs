use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::storage::SnapshotStore;

/// Process-local store, used when no `REDIS_URL` is configured and in tests.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
}

#[cfg(test)]
impl MemorySnapshotStore {
    /// A store that already holds `payload`, as if saved by an earlier run.
    pub fn with_payload(payload: Vec<u8>) -> Self {
        Self {
            slot: Mutex::new(Some(payload)),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `save` and `clear` calls served.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, payload: Vec<u8>) -> Result<()> {
        *self.slot.lock().await = Some(payload);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock().await = None;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
