//! Per-run counters of downloaded, skipped and failed files.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::sync::SyncOutcome;

/// Counters for one crawl run.
///
/// Shared between folder tasks; every counter is updated atomically.
#[derive(Debug, Default)]
pub struct CrawlStats {
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    failed_branches: AtomicUsize,
}

impl CrawlStats {
    /// Creates a stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written to disk.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Files whose local copy was already up to date.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Files that could not be synchronized.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Course or folder pages that could not be fetched or scraped.
    #[must_use]
    pub fn failed_branches(&self) -> usize {
        self.failed_branches.load(Ordering::SeqCst)
    }

    /// Files seen in total.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.downloaded() + self.skipped() + self.failed()
    }

    pub(crate) fn snapshot(&self) -> Self {
        Self {
            downloaded: AtomicUsize::new(self.downloaded()),
            skipped: AtomicUsize::new(self.skipped()),
            failed: AtomicUsize::new(self.failed()),
            failed_branches: AtomicUsize::new(self.failed_branches()),
        }
    }

    pub(crate) fn record_outcome(&self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Downloaded(_) => self.downloaded.fetch_add(1, Ordering::SeqCst),
            SyncOutcome::Skipped => self.skipped.fetch_add(1, Ordering::SeqCst),
        };
    }

    pub(crate) fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed_branches(&self) {
        self.failed_branches.fetch_add(1, Ordering::SeqCst);
    }
}
