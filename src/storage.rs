use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::core::{problem::ProblemCatalog, user::UserRegistry};

/// A dataset as of one successful refresh.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// 0 for the empty boot snapshot, incremented on every swap.
    pub version: u64,
    pub refreshed_at: DateTime<Utc>,
    pub data: T,
}

/// Holds the current snapshot of a dataset. Readers get their own `Arc` and keep
/// seeing that snapshot in full, whatever gets swapped in meanwhile.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    current: RwLock<Arc<Snapshot<T>>>,
}

impl<T: Default> SnapshotCell<T> {
    pub fn new() -> SnapshotCell<T> {
        SnapshotCell {
            current: RwLock::new(Arc::new(Snapshot {
                version: 0,
                refreshed_at: Utc::now(),
                data: T::default(),
            })),
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotCell<T> {
    pub fn load(&self) -> Arc<Snapshot<T>> {
        // A poisoned lock still holds a whole snapshot: only a pointer is written.
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }

    /// Replace the dataset in one step and return the new version.
    pub fn swap(&self, data: T) -> u64 {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let version = current.version + 1;
        *current = Arc::new(Snapshot {
            version,
            refreshed_at: Utc::now(),
            data,
        });
        version
    }
}

type SharedSnapshot<T> = Arc<SnapshotCell<T>>;

#[derive(Clone, Default)]
pub struct MemoryCache {
    pub users: SharedSnapshot<UserRegistry>,
    pub problems: SharedSnapshot<ProblemCatalog>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache {
            users: Arc::new(SnapshotCell::new()),
            problems: Arc::new(SnapshotCell::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.load().version == 0 || self.problems.load().version == 0
    }
}
