//! JWalk-based single-pass tree walker.
//!
//! Walks the tree once, prunes skip-listed directories before they are
//! opened, and sorts every regular file into the cheap buckets (empty,
//! junk, large, old) as it goes. Duplicate candidates come out as the flat
//! `records` list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;

use homesweep_core::{
    FileRecord, PathFilter, ScanConfig, ScanError, ScanStats, ScanWarning, WarningKind,
};

use crate::progress::ScanProgress;

/// Progress is broadcast every this many files.
const PROGRESS_INTERVAL: u64 = 500;

/// Everything a single walk produces.
#[derive(Debug, Clone)]
pub struct WalkOutput {
    /// Canonical root that was walked.
    pub root: PathBuf,
    /// Instant ages were measured against.
    pub reference_time: SystemTime,
    /// Every non-empty, non-junk file, in traversal order.
    pub records: Vec<FileRecord>,
    /// Zero-byte files.
    pub empty_files: Vec<FileRecord>,
    /// Visited directories with no retained children.
    pub empty_dirs: Vec<PathBuf>,
    /// Files matched by the junk rules.
    pub junk_files: Vec<FileRecord>,
    /// Files at or above the large threshold.
    pub large_files: Vec<FileRecord>,
    /// Files modified before the old cutoff.
    pub old_files: Vec<FileRecord>,
    /// Walk counters.
    pub stats: ScanStats,
    /// Entries that were skipped because they could not be read.
    pub warnings: Vec<ScanWarning>,
    /// Wall time of the walk.
    pub duration: Duration,
}

/// Single-pass walker using jwalk for traversal.
pub struct TreeWalker {
    progress_tx: broadcast::Sender<ScanProgress>,
    cancel: Arc<AtomicBool>,
}

impl TreeWalker {
    /// Create a new walker.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag with the caller.
    ///
    /// Setting the flag makes [`walk`](Self::walk) return
    /// [`ScanError::Interrupted`] before the next entry is processed.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// The flag checked between entries.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Subscribe to walk progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `config.root` and classify every regular file.
    pub fn walk(&self, config: &ScanConfig) -> Result<WalkOutput, ScanError> {
        let start = Instant::now();
        config.validate()?;
        let filter = Arc::new(PathFilter::new(&config.rules)?);

        let root = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        let reference_time = config.reference_time.unwrap_or_else(SystemTime::now);
        let old_cutoff = config.old_cutoff(reference_time)?;

        let mut collector = Collector::new(config.large_threshold, old_cutoff);
        self.collect_entries(config, &root, filter, &mut collector, start)?;

        let empty_dirs = collector.empty_dirs();
        let duration = start.elapsed();

        tracing::info!(
            root = %root.display(),
            files = collector.stats.files_scanned,
            dirs = collector.stats.dirs_scanned,
            bytes = collector.stats.bytes_scanned,
            warnings = collector.warnings.len(),
            "Walk finished in {:.2}s",
            duration.as_secs_f64()
        );

        Ok(WalkOutput {
            root,
            reference_time,
            records: collector.records,
            empty_files: collector.empty_files,
            empty_dirs,
            junk_files: collector.junk_files,
            large_files: collector.large_files,
            old_files: collector.old_files,
            stats: collector.stats,
            warnings: collector.warnings,
            duration,
        })
    }

    /// Drive jwalk over the tree, feeding every entry to the collector.
    fn collect_entries(
        &self,
        config: &ScanConfig,
        root: &Path,
        filter: Arc<PathFilter>,
        collector: &mut Collector,
        start: Instant,
    ) -> Result<(), ScanError> {
        // Same thread count as fingerprinting.
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let prune = Arc::clone(&filter);
        let walker = WalkDir::new(root)
            .parallelism(parallelism)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(0)
            .process_read_dir(move |depth, _dir, _state, children| {
                // The root itself arrives with no depth and is never pruned.
                if depth.is_none() {
                    return;
                }
                // Pruned directories are never opened.
                children.retain(|child| match child {
                    Ok(entry) => {
                        !(entry.file_type().is_dir() && prune.is_skipped_name(entry.file_name()))
                    }
                    Err(_) => true,
                });
            });

        for entry_result in walker {
            if self.cancel.load(Ordering::Relaxed) {
                tracing::info!("Walk cancelled");
                return Err(ScanError::Interrupted);
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    if let Some(path) = err.path() {
                        collector.mark_unreadable(path);
                        tracing::debug!(path = %path.display(), "Skipping entry: {err}");
                        collector.warnings.push(ScanWarning::new(
                            path,
                            err.to_string(),
                            WarningKind::ReadError,
                        ));
                    }
                    continue;
                }
            };

            let path = entry.path();
            let depth = entry.depth() as u32;
            if depth > 0 {
                collector.mark_parent(&path);
            }

            let file_type = entry.file_type();

            if file_type.is_dir() {
                collector.stats.record_dir(depth);
                collector.dirs.push(path.clone());
                if let Some(err) = &entry.read_children_error {
                    collector.mark_unreadable(&path);
                    collector.warnings.push(ScanWarning::new(
                        &path,
                        err.to_string(),
                        WarningKind::ReadError,
                    ));
                }
            } else if file_type.is_file() {
                collector.visit_file(&filter, path);

                let scanned = collector.stats.files_scanned;
                if scanned > 0 && scanned % PROGRESS_INTERVAL == 0 {
                    let _ = self.progress_tx.send(ScanProgress {
                        files_scanned: scanned,
                        dirs_scanned: collector.stats.dirs_scanned,
                        bytes_scanned: collector.stats.bytes_scanned,
                        current_path: collector.last_path(),
                        errors_count: collector.warnings.len() as u64,
                        elapsed: start.elapsed(),
                    });
                }
            } else {
                // Symlinks and special files keep their parent non-empty
                // but are never classified.
                tracing::trace!(path = %path.display(), "Ignoring non-regular file");
            }
        }

        let _ = self.progress_tx.send(ScanProgress {
            files_scanned: collector.stats.files_scanned,
            dirs_scanned: collector.stats.dirs_scanned,
            bytes_scanned: collector.stats.bytes_scanned,
            current_path: root.to_path_buf(),
            errors_count: collector.warnings.len() as u64,
            elapsed: start.elapsed(),
        });

        Ok(())
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable walk state, kept separate from the walker so `walk` can take `&self`.
struct Collector {
    large_threshold: u64,
    old_cutoff: SystemTime,
    records: Vec<FileRecord>,
    empty_files: Vec<FileRecord>,
    junk_files: Vec<FileRecord>,
    large_files: Vec<FileRecord>,
    old_files: Vec<FileRecord>,
    stats: ScanStats,
    warnings: Vec<ScanWarning>,
    /// Visited directories in traversal order.
    dirs: Vec<PathBuf>,
    /// Directories known to hold at least one retained child, or unreadable.
    occupied: HashSet<PathBuf>,
    last_file: Option<PathBuf>,
}

impl Collector {
    fn new(large_threshold: u64, old_cutoff: SystemTime) -> Self {
        Self {
            large_threshold,
            old_cutoff,
            records: Vec::new(),
            empty_files: Vec::new(),
            junk_files: Vec::new(),
            large_files: Vec::new(),
            old_files: Vec::new(),
            stats: ScanStats::new(),
            warnings: Vec::new(),
            dirs: Vec::new(),
            occupied: HashSet::new(),
            last_file: None,
        }
    }

    fn mark_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            if !self.occupied.contains(parent) {
                self.occupied.insert(parent.to_path_buf());
            }
        }
    }

    /// An entry we could not read still counts as content of its directory.
    fn mark_unreadable(&mut self, path: &Path) {
        self.occupied.insert(path.to_path_buf());
        self.mark_parent(path);
    }

    fn visit_file(&mut self, filter: &PathFilter, path: PathBuf) {
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(err) => {
                tracing::debug!(path = %path.display(), "Skipping file: {err}");
                self.warnings.push(ScanWarning::metadata(&path, &err));
                return;
            }
        };
        let modified = match metadata.modified() {
            Ok(t) => t,
            Err(err) => {
                self.warnings.push(ScanWarning::metadata(&path, &err));
                return;
            }
        };

        let size = metadata.len();
        self.stats.record_file(size);
        self.last_file = Some(path.clone());
        let record = FileRecord::new(path, size, modified);

        if size == 0 {
            self.empty_files.push(record);
        } else if filter.is_junk(&record.path) {
            self.junk_files.push(record);
        } else {
            if size >= self.large_threshold {
                self.large_files.push(record.clone());
            }
            if record.is_older_than(self.old_cutoff) {
                self.old_files.push(record.clone());
            }
            self.records.push(record);
        }
    }

    fn last_path(&self) -> PathBuf {
        self.last_file.clone().unwrap_or_default()
    }

    fn empty_dirs(&mut self) -> Vec<PathBuf> {
        let occupied = std::mem::take(&mut self.occupied);
        std::mem::take(&mut self.dirs)
            .into_iter()
            .filter(|dir| !occupied.contains(dir))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("docs")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg/deep")).unwrap();

        fs::write(root.join("notes.txt"), "hello").unwrap();
        fs::write(root.join("docs/report.md"), "quarterly numbers").unwrap();
        fs::write(root.join("docs/blank.txt"), "").unwrap();
        fs::write(root.join("docs/.DS_Store"), "junk").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "module.exports = 1").unwrap();

        temp
    }

    fn walk(config: &ScanConfig) -> WalkOutput {
        TreeWalker::new().walk(config).unwrap()
    }

    #[test]
    fn test_basic_walk() {
        let temp = create_test_tree();
        let output = walk(&ScanConfig::new(temp.path()));

        // node_modules is pruned, so its file is never seen
        assert_eq!(output.stats.files_scanned, 4);
        // root, docs, empty
        assert_eq!(output.stats.dirs_scanned, 3);
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.empty_files.len(), 1);
        assert_eq!(output.junk_files.len(), 1);
    }

    #[test]
    fn test_empty_dirs_detected() {
        let temp = create_test_tree();
        let output = walk(&ScanConfig::new(temp.path()));
        let root = temp.path().canonicalize().unwrap();

        assert_eq!(output.empty_dirs, vec![root.join("empty")]);
    }

    #[test]
    fn test_records_in_traversal_order() {
        let temp = create_test_tree();
        let output = walk(&ScanConfig::new(temp.path()));
        let names: Vec<_> = output
            .records
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["report.md", "notes.txt"]);
    }

    #[test]
    fn test_thread_count_sizes_walk_pool() {
        let temp = create_test_tree();
        let default = walk(&ScanConfig::new(temp.path()));
        let mut config = ScanConfig::new(temp.path());
        config.threads = 2;
        let dedicated = walk(&config);

        assert_eq!(dedicated.stats, default.stats);
        assert_eq!(dedicated.records, default.records);
        assert_eq!(dedicated.empty_dirs, default.empty_dirs);
    }

    #[test]
    fn test_cancelled_walk_returns_interrupted() {
        let temp = create_test_tree();
        let walker = TreeWalker::new();
        walker.cancel_flag().store(true, Ordering::Relaxed);

        let result = walker.walk(&ScanConfig::new(temp.path()));
        assert!(matches!(result, Err(ScanError::Interrupted)));
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = TreeWalker::new().walk(&ScanConfig::new(temp.path().join("nope")));
        assert!(matches!(result, Err(ScanError::NotFound { .. })));
    }

    #[test]
    fn test_root_is_file() {
        let temp = create_test_tree();
        let result = TreeWalker::new().walk(&ScanConfig::new(temp.path().join("notes.txt")));
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
