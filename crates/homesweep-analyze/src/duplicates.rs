//! Duplicate file detection using content fingerprints.
//!
//! Two-phase funnel:
//! 1. Group candidate records by exact size (encounter order, O(n))
//! 2. Fingerprint every member of each multi-member size group and regroup
//!    by fingerprint
//!
//! Size groups are fingerprinted in parallel on a rayon pool; the output is
//! merged back in first-encounter order so results are deterministic.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use derive_builder::Builder;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use homesweep_core::{
    FileRecord, Fingerprint, HashMode, ScanConfig, ScanError, ScanWarning,
};

use crate::fingerprint::fingerprint_file;

/// Configuration for duplicate detection.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Files must be strictly larger than this to be considered.
    #[builder(default = "1024")]
    pub min_size: u64,

    /// Fingerprint strategy.
    #[builder(default)]
    pub hash_mode: HashMode,

    /// Number of fingerprint threads (0 = rayon default).
    #[builder(default = "0")]
    pub threads: usize,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_size: 1024,
            hash_mode: HashMode::Quick,
            threads: 0,
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }
}

impl From<&ScanConfig> for DuplicateConfig {
    fn from(config: &ScanConfig) -> Self {
        Self {
            min_size: config.min_duplicate_size,
            hash_mode: config.hash_mode,
            threads: config.threads,
        }
    }
}

/// A set of files sharing size and fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Fingerprint shared by all members.
    pub fingerprint: Fingerprint,
    /// Size of each member in bytes.
    pub size: u64,
    /// Members, newest first. Never fewer than two.
    pub records: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// The member that is kept: the most recently modified one.
    pub fn keep(&self) -> &FileRecord {
        &self.records[0]
    }

    /// Every member except the kept one.
    pub fn removable(&self) -> &[FileRecord] {
        &self.records[1..]
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Space that removing the other members would reclaim.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * self.removable().len() as u64
    }
}

/// Output of a duplicate search.
#[derive(Debug, Clone, Default)]
pub struct DuplicateSets {
    /// Groups in first-encounter order of their size.
    pub groups: Vec<DuplicateGroup>,
    /// Files that could not be fingerprinted.
    pub warnings: Vec<ScanWarning>,
    /// Number of files fingerprinted.
    pub files_hashed: u64,
}

impl DuplicateSets {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Total reclaimable space across all groups.
    pub fn total_wasted_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_bytes).sum()
    }
}

/// Progress information during fingerprinting.
#[derive(Debug, Clone)]
pub struct HashProgress {
    /// Files fingerprinted so far.
    pub files_processed: u64,
    /// Files that will be fingerprinted.
    pub total_files: u64,
    /// Size groups finished so far.
    pub groups_processed: u64,
    /// Size groups to process.
    pub total_groups: u64,
}

/// Duplicate file resolver.
pub struct DuplicateResolver {
    config: DuplicateConfig,
    progress_tx: broadcast::Sender<HashProgress>,
    cancel: Arc<AtomicBool>,
}

impl DuplicateResolver {
    /// Create a new resolver with default config.
    pub fn new() -> Self {
        Self::with_config(DuplicateConfig::default())
    }

    /// Create a new resolver with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            progress_tx,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag, checked between files.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Publish progress on an existing channel.
    pub fn with_progress_sender(mut self, progress_tx: broadcast::Sender<HashProgress>) -> Self {
        self.progress_tx = progress_tx;
        self
    }

    /// Subscribe to fingerprint progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<HashProgress> {
        self.progress_tx.subscribe()
    }

    /// Find duplicate sets among `records`.
    ///
    /// The only error is cancellation, or a thread pool that cannot be built.
    pub fn find_duplicates(&self, records: &[FileRecord]) -> Result<DuplicateSets, ScanError> {
        let start = Instant::now();

        let size_groups = self.group_by_size(records);
        let total_groups = size_groups.len() as u64;
        let total_files: u64 = size_groups.iter().map(|(_, g)| g.len() as u64).sum();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| ScanError::InvalidConfig {
                message: format!("Cannot start fingerprint workers: {e}"),
            })?;

        let counters = Counters {
            files: AtomicU64::new(0),
            groups: AtomicU64::new(0),
            total_files,
            total_groups,
        };

        let outcomes: Vec<SizeGroupOutcome> = pool.install(|| {
            size_groups
                .par_iter()
                .map(|(size, members)| self.resolve_size_group(*size, members, &counters))
                .collect::<Result<Vec<_>, ScanError>>()
        })?;

        let mut sets = DuplicateSets {
            files_hashed: counters.files.load(Ordering::Relaxed),
            ..DuplicateSets::default()
        };
        for outcome in outcomes {
            sets.groups.extend(outcome.groups);
            sets.warnings.extend(outcome.warnings);
        }

        tracing::info!(
            candidates = total_files,
            groups = sets.groups.len(),
            wasted = sets.total_wasted_bytes(),
            "Duplicate search finished in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        Ok(sets)
    }

    /// Group records above the size floor by exact size, dropping singletons.
    fn group_by_size<'a>(&self, records: &'a [FileRecord]) -> Vec<(u64, Vec<&'a FileRecord>)> {
        let mut groups: IndexMap<u64, Vec<&FileRecord>> = IndexMap::new();
        for record in records.iter().filter(|r| r.size > self.config.min_size) {
            groups.entry(record.size).or_default().push(record);
        }
        groups.into_iter().filter(|(_, g)| g.len() > 1).collect()
    }

    fn resolve_size_group(
        &self,
        size: u64,
        members: &[&FileRecord],
        counters: &Counters,
    ) -> Result<SizeGroupOutcome, ScanError> {
        let mut by_fingerprint: IndexMap<Fingerprint, Vec<FileRecord>> = IndexMap::new();
        let mut warnings = Vec::new();

        for record in members {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(ScanError::Interrupted);
            }

            match fingerprint_file(&record.path, self.config.hash_mode) {
                Ok(fingerprint) => by_fingerprint
                    .entry(fingerprint)
                    .or_default()
                    .push((*record).clone()),
                Err(err) => {
                    tracing::debug!(path = %record.path.display(), "Cannot fingerprint: {err}");
                    warnings.push(ScanWarning::hash_error(&record.path, &err));
                }
            }
            counters.files.fetch_add(1, Ordering::Relaxed);
        }

        let groups = by_fingerprint
            .into_iter()
            .filter(|(_, records)| records.len() > 1)
            .map(|(fingerprint, mut records)| {
                // Stable, so equal mtimes keep traversal order.
                records.sort_by(|a, b| b.modified.cmp(&a.modified));
                DuplicateGroup {
                    fingerprint,
                    size,
                    records,
                }
            })
            .collect();

        let groups_processed = counters.groups.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.progress_tx.send(HashProgress {
            files_processed: counters.files.load(Ordering::Relaxed),
            total_files: counters.total_files,
            groups_processed,
            total_groups: counters.total_groups,
        });

        Ok(SizeGroupOutcome { groups, warnings })
    }
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        Self::new()
    }
}

struct Counters {
    files: AtomicU64,
    groups: AtomicU64,
    total_files: u64,
    total_groups: u64,
}

struct SizeGroupOutcome {
    groups: Vec<DuplicateGroup>,
    warnings: Vec<ScanWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn record(path: &Path) -> FileRecord {
        let meta = fs::metadata(path).unwrap();
        FileRecord::new(path, meta.len(), meta.modified().unwrap())
    }

    fn write_aged(path: &Path, content: &[u8], secs_ago: u64) -> FileRecord {
        fs::write(path, content).unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
            .unwrap();
        record(path)
    }

    #[test]
    fn test_groups_newest_first() {
        let temp = TempDir::new().unwrap();
        let content = vec![7u8; 2048];
        let old = write_aged(&temp.path().join("old.bin"), &content, 3000);
        let new = write_aged(&temp.path().join("new.bin"), &content, 10);
        let mid = write_aged(&temp.path().join("mid.bin"), &content, 500);

        let sets = DuplicateResolver::new()
            .find_duplicates(&[old.clone(), new.clone(), mid.clone()])
            .unwrap();

        assert_eq!(sets.groups.len(), 1);
        let group = &sets.groups[0];
        assert_eq!(group.records, vec![new.clone(), mid.clone(), old.clone()]);
        assert_eq!(group.keep(), &new);
        assert_eq!(group.removable(), &[mid, old]);
        assert_eq!(group.wasted_bytes(), 4096);
        assert_eq!(sets.files_hashed, 3);
    }

    #[test]
    fn test_small_files_ignored() {
        let temp = TempDir::new().unwrap();
        let content = vec![1u8; 1024];
        let a = write_aged(&temp.path().join("a"), &content, 0);
        let b = write_aged(&temp.path().join("b"), &content, 0);

        let sets = DuplicateResolver::new().find_duplicates(&[a, b]).unwrap();
        assert!(!sets.has_duplicates());
        assert_eq!(sets.files_hashed, 0);
    }

    #[test]
    fn test_same_size_different_content() {
        let temp = TempDir::new().unwrap();
        let a = write_aged(&temp.path().join("a"), &vec![1u8; 4000], 0);
        let b = write_aged(&temp.path().join("b"), &vec![2u8; 4000], 0);

        let sets = DuplicateResolver::new().find_duplicates(&[a, b]).unwrap();
        assert!(sets.groups.is_empty());
        assert_eq!(sets.files_hashed, 2);
    }

    #[test]
    fn test_vanished_member_dropped_with_warning() {
        let temp = TempDir::new().unwrap();
        let content = vec![3u8; 2048];
        let a = write_aged(&temp.path().join("a"), &content, 0);
        let b = write_aged(&temp.path().join("b"), &content, 0);
        let c = write_aged(&temp.path().join("c"), &content, 0);
        fs::remove_file(&c.path).unwrap();

        let sets = DuplicateResolver::new().find_duplicates(&[a, b, c]).unwrap();
        assert_eq!(sets.groups.len(), 1);
        assert_eq!(sets.groups[0].count(), 2);
        assert_eq!(sets.warnings.len(), 1);
    }

    #[test]
    fn test_cancelled() {
        let temp = TempDir::new().unwrap();
        let content = vec![3u8; 2048];
        let a = write_aged(&temp.path().join("a"), &content, 0);
        let b = write_aged(&temp.path().join("b"), &content, 0);

        let cancel = Arc::new(AtomicBool::new(true));
        let result = DuplicateResolver::new()
            .with_cancel_flag(cancel)
            .find_duplicates(&[a, b]);
        assert!(matches!(result, Err(ScanError::Interrupted)));
    }

    #[test]
    fn test_progress_is_published() {
        let temp = TempDir::new().unwrap();
        let content = vec![5u8; 2048];
        let a = write_aged(&temp.path().join("a"), &content, 0);
        let b = write_aged(&temp.path().join("b"), &content, 0);

        let resolver = DuplicateResolver::new();
        let mut rx = resolver.subscribe();
        resolver.find_duplicates(&[a, b]).unwrap();

        let progress = rx.try_recv().unwrap();
        assert_eq!(progress.files_processed, 2);
        assert_eq!(progress.groups_processed, 1);
        assert_eq!(progress.total_groups, 1);
    }
}
