//! Classified scan results and per-category views.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use strum::IntoEnumIterator;

use homesweep_core::{Category, FileRecord, ScanStats, ScanWarning};
use homesweep_scan::WalkOutput;

use crate::duplicates::{DuplicateGroup, DuplicateSets};

/// One listed entry of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryItem {
    /// File or directory path.
    pub path: PathBuf,
    /// Size recorded at scan time (0 for directories).
    pub size: u64,
    /// Modification time recorded at scan time (None for directories).
    pub modified: Option<SystemTime>,
    /// Index of the duplicate group this item belongs to.
    pub group: Option<usize>,
    /// Whether this is the kept member of its duplicate group.
    pub keep: bool,
}

impl CategoryItem {
    fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            size: record.size,
            modified: Some(record.modified),
            group: None,
            keep: false,
        }
    }

    fn from_dir(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            size: 0,
            modified: None,
            group: None,
            keep: false,
        }
    }
}

/// Count, items and reclaimable bytes of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// The category summarized.
    pub category: Category,
    /// Number of duplicate groups, or number of items for other categories.
    pub count: usize,
    /// Listed entries in presentation order.
    pub items: Vec<CategoryItem>,
    /// Current on-disk size of what removing the category would free.
    pub total_bytes: u64,
}

impl CategorySummary {
    /// Check if there is nothing in this category.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Everything one scan found.
///
/// A scan result is never refreshed: files changed after the scan show up
/// with stale records, and only [`clear`](Self::clear) mutates it.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Canonical root that was scanned.
    pub root: PathBuf,
    /// Instant ages were measured against.
    pub reference_time: SystemTime,
    /// Duplicate groups, in first-encounter order of their size.
    pub duplicates: Vec<DuplicateGroup>,
    /// Zero-byte files, traversal order.
    pub empty_files: Vec<FileRecord>,
    /// Directories with no retained children, traversal order.
    pub empty_dirs: Vec<PathBuf>,
    /// Junk files, traversal order.
    pub junk_files: Vec<FileRecord>,
    /// Large files, biggest first.
    pub large_files: Vec<FileRecord>,
    /// Old files, oldest first.
    pub old_files: Vec<FileRecord>,
    /// Walk counters.
    pub stats: ScanStats,
    /// Non-fatal problems from both phases.
    pub warnings: Vec<ScanWarning>,
    /// Wall time of the whole scan.
    pub duration: Duration,
    cleared: BTreeSet<Category>,
}

impl ScanResult {
    /// Assemble a result from the two scan phases.
    pub fn new(walk: WalkOutput, duplicates: DuplicateSets, duration: Duration) -> Self {
        let WalkOutput {
            root,
            reference_time,
            empty_files,
            empty_dirs,
            junk_files,
            mut large_files,
            mut old_files,
            stats,
            mut warnings,
            ..
        } = walk;

        large_files.sort_by(|a, b| b.size.cmp(&a.size));
        old_files.sort_by_key(|r| r.modified);
        warnings.extend(duplicates.warnings);

        Self {
            root,
            reference_time,
            duplicates: duplicates.groups,
            empty_files,
            empty_dirs,
            junk_files,
            large_files,
            old_files,
            stats,
            warnings,
            duration,
            cleared: BTreeSet::new(),
        }
    }

    /// Summarize one category.
    pub fn category(&self, category: Category) -> CategorySummary {
        let (count, items) = match category {
            Category::Duplicates => {
                let items = self
                    .duplicates
                    .iter()
                    .enumerate()
                    .flat_map(|(index, group)| {
                        group.records.iter().enumerate().map(move |(pos, record)| {
                            CategoryItem {
                                group: Some(index),
                                keep: pos == 0,
                                ..CategoryItem::from_record(record)
                            }
                        })
                    })
                    .collect();
                (self.duplicates.len(), items)
            }
            Category::EmptyDirs => {
                let items: Vec<_> = self.empty_dirs.iter().map(|d| CategoryItem::from_dir(d)).collect();
                (items.len(), items)
            }
            _ => {
                let items: Vec<_> = self
                    .records(category)
                    .iter()
                    .map(CategoryItem::from_record)
                    .collect();
                (items.len(), items)
            }
        };

        let total_bytes = if category.is_directory_category() {
            0
        } else {
            self.files_to_remove(category).iter().map(|p| current_size(p)).sum()
        };

        CategorySummary {
            category,
            count,
            items,
            total_bytes,
        }
    }

    /// Summaries of all six categories in menu order.
    pub fn summaries(&self) -> Vec<CategorySummary> {
        Category::iter().map(|c| self.category(c)).collect()
    }

    /// Paths that disposing of `category` would remove.
    ///
    /// For duplicates the kept member of every group is left out.
    pub fn files_to_remove(&self, category: Category) -> Vec<PathBuf> {
        match category {
            Category::Duplicates => self
                .duplicates
                .iter()
                .flat_map(|g| g.removable().iter().map(|r| r.path.clone()))
                .collect(),
            Category::EmptyDirs => self.empty_dirs.clone(),
            _ => self.records(category).iter().map(|r| r.path.clone()).collect(),
        }
    }

    /// Mark a category as handled and drop its contents.
    ///
    /// Never touches the filesystem.
    pub fn clear(&mut self, category: Category) {
        match category {
            Category::Duplicates => self.duplicates.clear(),
            Category::EmptyFiles => self.empty_files.clear(),
            Category::EmptyDirs => self.empty_dirs.clear(),
            Category::JunkFiles => self.junk_files.clear(),
            Category::LargeFiles => self.large_files.clear(),
            Category::OldFiles => self.old_files.clear(),
        }
        self.cleared.insert(category);
    }

    /// Whether `category` has been cleared.
    pub fn is_cleared(&self, category: Category) -> bool {
        self.cleared.contains(&category)
    }

    /// Sum of the counts of every category.
    pub fn total_items(&self) -> usize {
        Category::iter().map(|c| self.count(c)).sum()
    }

    /// Check if nothing was found.
    pub fn is_clean(&self) -> bool {
        self.total_items() == 0
    }

    fn count(&self, category: Category) -> usize {
        match category {
            Category::Duplicates => self.duplicates.len(),
            Category::EmptyDirs => self.empty_dirs.len(),
            _ => self.records(category).len(),
        }
    }

    /// Record list backing a file category. Empty for the other two.
    fn records(&self, category: Category) -> &[FileRecord] {
        match category {
            Category::EmptyFiles => &self.empty_files,
            Category::JunkFiles => &self.junk_files,
            Category::LargeFiles => &self.large_files,
            Category::OldFiles => &self.old_files,
            Category::Duplicates | Category::EmptyDirs => &[],
        }
    }
}

/// Size on disk right now; files that vanished count as zero.
fn current_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesweep_core::Fingerprint;
    use std::fs;
    use tempfile::TempDir;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn empty_walk(root: &Path) -> WalkOutput {
        WalkOutput {
            root: root.to_path_buf(),
            reference_time: at(1_000_000),
            records: Vec::new(),
            empty_files: Vec::new(),
            empty_dirs: Vec::new(),
            junk_files: Vec::new(),
            large_files: Vec::new(),
            old_files: Vec::new(),
            stats: ScanStats::new(),
            warnings: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_sorted_views() {
        let mut walk = empty_walk(Path::new("/r"));
        walk.large_files = vec![
            FileRecord::new("/r/a", 200, at(5)),
            FileRecord::new("/r/b", 900, at(5)),
            FileRecord::new("/r/c", 200, at(5)),
        ];
        walk.old_files = vec![
            FileRecord::new("/r/x", 1, at(30)),
            FileRecord::new("/r/y", 1, at(10)),
            FileRecord::new("/r/z", 1, at(20)),
        ];

        let result = ScanResult::new(walk, DuplicateSets::default(), Duration::ZERO);

        assert_eq!(
            result.files_to_remove(Category::LargeFiles),
            vec![PathBuf::from("/r/b"), PathBuf::from("/r/a"), PathBuf::from("/r/c")]
        );
        assert_eq!(
            result.files_to_remove(Category::OldFiles),
            vec![PathBuf::from("/r/y"), PathBuf::from("/r/z"), PathBuf::from("/r/x")]
        );
    }

    #[test]
    fn test_duplicate_view_and_totals() {
        let temp = TempDir::new().unwrap();
        for name in ["keep", "dup1", "dup2"] {
            fs::write(temp.path().join(name), vec![0u8; 2000]).unwrap();
        }
        let group = DuplicateGroup {
            fingerprint: Fingerprint::new([1; 32]),
            size: 2000,
            records: ["keep", "dup1", "dup2"]
                .iter()
                .map(|n| FileRecord::new(temp.path().join(n), 2000, at(1)))
                .collect(),
        };
        let sets = DuplicateSets {
            groups: vec![group],
            ..DuplicateSets::default()
        };

        let result = ScanResult::new(empty_walk(temp.path()), sets, Duration::ZERO);
        let summary = result.category(Category::Duplicates);

        assert_eq!(summary.count, 1);
        assert_eq!(summary.items.len(), 3);
        assert!(summary.items[0].keep);
        assert!(!summary.items[1].keep);
        assert_eq!(summary.total_bytes, 4000);
        assert!(!result
            .files_to_remove(Category::Duplicates)
            .contains(&temp.path().join("keep")));
    }

    #[test]
    fn test_vanished_files_count_zero() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("present.log");
        fs::write(&present, "12345").unwrap();

        let mut walk = empty_walk(temp.path());
        walk.junk_files = vec![
            FileRecord::new(&present, 5, at(1)),
            FileRecord::new(temp.path().join("gone.log"), 99, at(1)),
        ];
        let result = ScanResult::new(walk, DuplicateSets::default(), Duration::ZERO);

        let summary = result.category(Category::JunkFiles);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_bytes, 5);
    }

    #[test]
    fn test_clear_is_in_memory_only() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("empty");
        fs::create_dir(&dir).unwrap();

        let mut walk = empty_walk(temp.path());
        walk.empty_dirs = vec![dir.clone()];
        let mut result = ScanResult::new(walk, DuplicateSets::default(), Duration::ZERO);
        assert_eq!(result.total_items(), 1);
        // Directories carry no byte total.
        let summary = result.category(Category::EmptyDirs);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_bytes, 0);

        result.clear(Category::EmptyDirs);

        assert!(result.is_cleared(Category::EmptyDirs));
        assert!(!result.is_cleared(Category::JunkFiles));
        assert!(result.category(Category::EmptyDirs).is_empty());
        assert!(result.is_clean());
        assert!(dir.exists());
    }
}
