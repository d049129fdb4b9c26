//! Per-destination write serialization.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async locks keyed by destination path.
///
/// Two folders that sanitize to the same names map to the same mirror
/// path; holding the lock for a path across stat, HEAD and download keeps
/// concurrent crawls from writing one file twice at once. Entries live for
/// the lifetime of the map, which is one crawl run.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    /// Creates an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `path`.
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Number of distinct paths seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no path has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
