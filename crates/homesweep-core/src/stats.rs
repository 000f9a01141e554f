//! Scan statistics.

use serde::{Deserialize, Serialize};

/// Counters accumulated while walking a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files whose metadata was read successfully.
    pub files_scanned: u64,
    /// Directories visited (the root included).
    pub dirs_scanned: u64,
    /// Sum of the sizes of all scanned files.
    pub bytes_scanned: u64,
    /// Deepest directory level reached below the root.
    pub max_depth: u32,
}

impl ScanStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a file entry.
    pub fn record_file(&mut self, size: u64) {
        self.files_scanned += 1;
        self.bytes_scanned += size;
    }

    /// Record a directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.dirs_scanned += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_stats_default() {
        let stats = ScanStats::default();
        assert_eq!(stats.files_scanned, 0);
        assert_eq!(stats.dirs_scanned, 0);
        assert_eq!(stats.bytes_scanned, 0);
    }

    #[test]
    fn test_scan_stats_record() {
        let mut stats = ScanStats::new();

        stats.record_file(1024);
        stats.record_file(0);
        stats.record_dir(0);
        stats.record_dir(3);

        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.bytes_scanned, 1024);
        assert_eq!(stats.dirs_scanned, 2);
        assert_eq!(stats.max_depth, 3);
    }
}
