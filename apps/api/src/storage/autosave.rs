//! Debounced autosave.
//!
//! Edits publish the newest serialized state on a `watch` channel. The worker
//! writes only after a full debounce window passes with no newer state, so a
//! burst of edits costs one write. States replaced inside a window are never
//! written. Dropping the [`Autosave`] handle flushes the pending state and
//! stops the worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::storage::SnapshotStore;

#[derive(Debug, Clone)]
enum Pending {
    Idle,
    Save(Vec<u8>),
    Clear,
}

pub struct Autosave {
    tx: watch::Sender<Pending>,
}

impl Autosave {
    /// Starts the worker on the current runtime.
    pub fn spawn(store: Arc<dyn SnapshotStore>, debounce: Duration) -> (Self, JoinHandle<()>) {
        let (tx, rx) = watch::channel(Pending::Idle);
        let worker = tokio::spawn(run_worker(rx, store, debounce));
        (Self { tx }, worker)
    }

    /// Schedules `payload` to replace the stored snapshot.
    pub fn schedule_save(&self, payload: Vec<u8>) {
        self.tx.send_replace(Pending::Save(payload));
    }

    /// Schedules removal of the stored snapshot. A later save supersedes it.
    pub fn schedule_clear(&self) {
        self.tx.send_replace(Pending::Clear);
    }
}

async fn run_worker(
    mut rx: watch::Receiver<Pending>,
    store: Arc<dyn SnapshotStore>,
    debounce: Duration,
) {
    while rx.changed().await.is_ok() {
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let pending = rx.borrow_and_update().clone();
        match pending {
            Pending::Idle => {}
            Pending::Save(payload) => {
                if let Err(e) = store.save(payload).await {
                    warn!("Autosave failed: {e:#}");
                }
            }
            Pending::Clear => {
                if let Err(e) = store.clear().await {
                    warn!("Clearing saved snapshot failed: {e:#}");
                }
            }
        }
    }
    debug!("Autosave worker stopped");
}
