//! Persistence of the editing session: one snapshot record under one key.
//!
//! Backends implement [`SnapshotStore`]. Writes are driven by the debounced
//! [`autosave::Autosave`] worker, never directly by edits.

pub mod autosave;
pub mod memory;
pub mod redis_store;

use anyhow::Result;
use async_trait::async_trait;

pub use autosave::Autosave;
pub use memory::MemorySnapshotStore;
pub use redis_store::RedisSnapshotStore;

/// Single-record store for the serialized session snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the stored payload, or `None` when nothing has been saved.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replaces the stored payload.
    async fn save(&self, payload: Vec<u8>) -> Result<()>;

    /// Removes the stored payload. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}
