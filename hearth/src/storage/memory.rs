use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tokio::sync::Mutex;

use super::{Snapshot, SnapshotStore};
use crate::errors::HearthResult;

/// Keeps the last saved snapshot in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Snapshot>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(snapshot))),
            saves: Arc::default(),
        }
    }

    /// The last saved snapshot.
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.slot.lock().await.clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for MemoryStore {
    async fn load(&self) -> HearthResult<Option<Snapshot>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> HearthResult<()> {
        *self.slot.lock().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}
