//! Two-phase scan orchestration.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use homesweep_core::{ScanConfig, ScanError};
use homesweep_scan::{ScanProgress, TreeWalker};

use crate::duplicates::{DuplicateConfig, DuplicateResolver, HashProgress};
use crate::report::ScanResult;

/// Runs the tree walk and then the duplicate search over its candidates.
///
/// Both phases share one cancellation flag; setting it discards the whole
/// scan.
pub struct Sweeper {
    walker: TreeWalker,
    hash_tx: broadcast::Sender<HashProgress>,
    cancel: Arc<AtomicBool>,
}

impl Sweeper {
    /// Create a new sweeper.
    pub fn new() -> Self {
        Self::with_cancel_flag(Arc::new(AtomicBool::new(false)))
    }

    /// Create a sweeper that stops when `cancel` is set.
    pub fn with_cancel_flag(cancel: Arc<AtomicBool>) -> Self {
        let (hash_tx, _) = broadcast::channel(100);
        Self {
            walker: TreeWalker::new().with_cancel_flag(Arc::clone(&cancel)),
            hash_tx,
            cancel,
        }
    }

    /// The shared cancellation flag.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Subscribe to walk progress.
    pub fn subscribe_walk(&self) -> broadcast::Receiver<ScanProgress> {
        self.walker.subscribe()
    }

    /// Subscribe to fingerprint progress.
    pub fn subscribe_hash(&self) -> broadcast::Receiver<HashProgress> {
        self.hash_tx.subscribe()
    }

    /// Scan `config.root` and classify everything it holds.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        let start = Instant::now();

        let walk = self.walker.walk(config)?;

        let duplicates = DuplicateResolver::with_config(DuplicateConfig::from(config))
            .with_cancel_flag(Arc::clone(&self.cancel))
            .with_progress_sender(self.hash_tx.clone())
            .find_duplicates(&walk.records)?;

        let result = ScanResult::new(walk, duplicates, start.elapsed());
        tracing::info!(
            items = result.total_items(),
            warnings = result.warnings.len(),
            "Scan finished in {:.2}s",
            result.duration.as_secs_f64()
        );
        Ok(result)
    }
}

impl Default for Sweeper {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan `root` with default rules and the given thresholds.
pub fn scan(
    root: impl Into<PathBuf>,
    large_threshold: u64,
    old_threshold_days: u32,
) -> Result<ScanResult, ScanError> {
    let mut config = ScanConfig::new(root);
    config.large_threshold = large_threshold;
    config.old_threshold_days = old_threshold_days;
    Sweeper::new().scan(&config)
}
