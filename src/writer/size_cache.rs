//! Shared per-path file size cache
//!
//! Tracks the current size of each target file so the writer never stats
//! the file on the hot path. One entry per file identity, lazily created on
//! first write, reset to zero on rotation.
//!
//! The cache is an explicit handle rather than a process-wide static:
//! loggers that target the same file must be given clones of the same
//! handle. The outer map lock is held only long enough to fetch or create
//! an entry; the per-file lock is what callers hold across a
//! rotate-then-append sequence, so unrelated log streams never contend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cached size state for one file identity
pub type SizeEntry = Arc<Mutex<u64>>;

#[derive(Debug, Clone, Default)]
pub struct SizeCache {
    entries: Arc<Mutex<HashMap<PathBuf, SizeEntry>>>,
}

impl SizeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the entry for a path, creating it at zero if unseen
    #[must_use]
    pub fn entry(&self, path: &Path) -> SizeEntry {
        let mut entries = self.entries.lock();
        entries
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(0)))
            .clone()
    }

    /// Current cached size for a path, without creating an entry
    #[must_use]
    pub fn size_of(&self, path: &Path) -> Option<u64> {
        let entries = self.entries.lock();
        entries.get(path).map(|e| *e.lock())
    }

    /// Number of tracked file identities
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
