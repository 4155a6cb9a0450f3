//! The live editing session.
//!
//! One `ResumeSession` owns the current resume and preferences. Every change
//! is computed from the current value under the write lock and swapped in as
//! a whole, then handed to the debounced autosave.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::editing::ModelError;
use crate::export::snapshot::{self, Snapshot};
use crate::models::{Preferences, Resume};
use crate::storage::{Autosave, SnapshotStore};

pub struct ResumeSession {
    state: RwLock<Snapshot>,
    autosave: Autosave,
}

impl ResumeSession {
    /// Restores the saved snapshot from `store` and starts the autosave worker.
    ///
    /// A missing, unreadable or undecodable record starts a blank session.
    pub async fn open(store: Arc<dyn SnapshotStore>, debounce: Duration) -> (Self, JoinHandle<()>) {
        let restored = match store.load().await {
            Ok(Some(bytes)) => match snapshot::deserialize(&bytes) {
                Ok(saved) => {
                    info!("Restored saved resume snapshot");
                    saved
                }
                Err(e) => {
                    warn!("Ignoring saved snapshot: {e}");
                    Snapshot::default()
                }
            },
            Ok(None) => Snapshot::default(),
            Err(e) => {
                warn!("Could not read saved snapshot: {e:#}");
                Snapshot::default()
            }
        };

        let (autosave, worker) = Autosave::spawn(store, debounce);
        let session = Self {
            state: RwLock::new(restored),
            autosave,
        };
        (session, worker)
    }

    pub async fn current(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Cheap copy of the current resume for exporters; lists stay shared.
    pub async fn resume(&self) -> Resume {
        self.state.read().await.resume.clone()
    }

    /// Replaces the resume with `edit(current)`. On error nothing changes.
    pub async fn apply<F>(&self, edit: F) -> Result<Snapshot, ModelError>
    where
        F: FnOnce(&Resume) -> Result<Resume, ModelError>,
    {
        let mut state = self.state.write().await;
        let next = edit(&state.resume)?;
        state.resume = next;
        self.persist(&state);
        Ok(state.clone())
    }

    pub async fn update_preferences<F>(&self, update: F) -> Snapshot
    where
        F: FnOnce(&mut Preferences),
    {
        let mut state = self.state.write().await;
        update(&mut state.preferences);
        self.persist(&state);
        state.clone()
    }

    /// Replaces the resume with a decoded snapshot payload.
    ///
    /// Preferences in the payload are ignored. Returns `None`, with the
    /// session untouched, when the payload does not decode.
    pub async fn import(&self, bytes: &[u8]) -> Option<Snapshot> {
        let imported = match snapshot::deserialize(bytes) {
            Ok(imported) => imported,
            Err(e) => {
                warn!("Import rejected: {e}");
                return None;
            }
        };

        let mut state = self.state.write().await;
        state.resume = imported.resume;
        self.persist(&state);
        info!("Imported resume snapshot");
        Some(state.clone())
    }

    /// Restores a blank resume and drops the saved record. Preferences stay.
    pub async fn reset(&self) -> Snapshot {
        let mut state = self.state.write().await;
        state.resume = Resume::default();
        self.autosave.schedule_clear();
        state.clone()
    }

    fn persist(&self, state: &Snapshot) {
        match snapshot::serialize(&state.resume, &state.preferences) {
            Ok(payload) => self.autosave.schedule_save(payload),
            Err(e) => warn!("Could not serialize resume for autosave: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::lists::{append, ListField};
    use crate::editing::path::mutate_str;
    use crate::storage::MemorySnapshotStore;

    const WINDOW: Duration = Duration::from_millis(500);

    async fn open_with(store: Arc<MemorySnapshotStore>) -> ResumeSession {
        ResumeSession::open(store, WINDOW).await.0
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_without_saved_state_is_blank() {
        let session = open_with(Arc::new(MemorySnapshotStore::default())).await;
        assert_eq!(session.current().await, Snapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_restores_resume_and_preferences() {
        let saved = snapshot::serialize(
            &Resume::sample(),
            &Preferences { dark: true, compact: false },
        )
        .unwrap();
        let session = open_with(Arc::new(MemorySnapshotStore::with_payload(saved))).await;

        let current = session.current().await;
        assert_eq!(current.resume, Resume::sample());
        assert!(current.preferences.dark);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_with_corrupt_record_starts_blank() {
        let store = Arc::new(MemorySnapshotStore::with_payload(b"{not json".to_vec()));
        let session = open_with(store).await;
        assert_eq!(session.current().await, Snapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_edit_leaves_state_unchanged() {
        let session = open_with(Arc::new(MemorySnapshotStore::default())).await;
        let err = session
            .apply(|resume| mutate_str(resume, "experience.9.role", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidPath(_)));
        assert_eq!(session.resume().await, Resume::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_autosaved_after_debounce() {
        let store = Arc::new(MemorySnapshotStore::default());
        let session = open_with(store.clone()).await;

        session
            .apply(|resume| mutate_str(resume, "name", "Ada"))
            .await
            .unwrap();
        session
            .apply(|resume| Ok(append(resume, ListField::Certifications)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.writes(), 1);
        let saved = snapshot::deserialize(&store.load().await.unwrap().unwrap()).unwrap();
        assert_eq!(saved.resume.name, "Ada");
        assert_eq!(saved.resume.certifications.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_import_is_ignored() {
        let session = open_with(Arc::new(MemorySnapshotStore::default())).await;
        session
            .apply(|resume| mutate_str(resume, "name", "Keep Me"))
            .await
            .unwrap();

        assert!(session.import(b"[1, 2, 3]").await.is_none());
        assert!(session.import(b"{oops").await.is_none());
        assert_eq!(session.resume().await.name, "Keep Me");
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_replaces_resume_but_keeps_preferences() {
        let session = open_with(Arc::new(MemorySnapshotStore::default())).await;
        session.update_preferences(|prefs| prefs.compact = true).await;

        let payload = snapshot::serialize(&Resume::sample(), &Preferences { dark: true, compact: false })
            .unwrap();
        let imported = session.import(&payload).await.unwrap();

        assert_eq!(imported.resume, Resume::sample());
        assert_eq!(imported.preferences, Preferences { dark: false, compact: true });
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_blanks_resume_and_clears_store() {
        let saved = snapshot::serialize(&Resume::sample(), &Preferences { dark: true, compact: false })
            .unwrap();
        let store = Arc::new(MemorySnapshotStore::with_payload(saved));
        let session = open_with(store.clone()).await;

        let after = session.reset().await;
        assert_eq!(after.resume, Resume::default());
        assert!(after.preferences.dark);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.load().await.unwrap(), None);
    }
}
