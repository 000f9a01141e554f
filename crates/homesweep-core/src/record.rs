//! File records and content fingerprints.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// BLAKE3 digest used to group duplicate candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Create a new Fingerprint from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the fingerprint as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Point-in-time snapshot of a regular file taken during a scan.
///
/// Records are never refreshed; if the file changes after the scan the
/// record is simply stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a new record.
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            modified,
        }
    }

    /// Whether the file was last modified before `cutoff`.
    pub fn is_older_than(&self, cutoff: SystemTime) -> bool {
        self.modified < cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fingerprint_hex() {
        let fp = Fingerprint::new([0xab; 32]);
        assert_eq!(fp.to_hex().len(), 64);
        assert!(fp.to_hex().starts_with("abab"));
        assert_eq!(fp.to_string(), fp.to_hex());
    }

    #[test]
    fn test_is_older_than() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let record = FileRecord::new("/a", 1, t);

        assert!(record.is_older_than(t + Duration::from_secs(1)));
        assert!(!record.is_older_than(t));
    }
}
