//! Scan configuration types.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::filter::FilterRules;

/// Default byte size at or above which a file is "large" (100 MiB).
pub const DEFAULT_LARGE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Default number of days after which an unmodified file is "old".
pub const DEFAULT_OLD_DAYS: u32 = 120;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// How file content is fingerprinted for duplicate detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// Head + tail + size sample for files above 8 KiB.
    #[default]
    Quick,
    /// Entire file content.
    Full,
}

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Files of at least this many bytes are reported as large.
    #[builder(default = "DEFAULT_LARGE_THRESHOLD")]
    #[serde(default = "default_large_threshold")]
    pub large_threshold: u64,

    /// Files not modified for more than this many days are reported as old.
    #[builder(default = "DEFAULT_OLD_DAYS")]
    #[serde(default = "default_old_days")]
    pub old_threshold_days: u32,

    /// Fingerprint strategy for duplicate candidates.
    #[builder(default)]
    #[serde(default)]
    pub hash_mode: HashMode,

    /// Files must be strictly larger than this to be duplicate candidates.
    #[builder(default = "1024")]
    #[serde(default = "default_min_duplicate_size")]
    pub min_duplicate_size: u64,

    /// Worker threads for both the walk and fingerprinting (0 = rayon's
    /// global pool).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Reference time for age calculations (None = time the scan starts).
    #[builder(default)]
    #[serde(default)]
    pub reference_time: Option<SystemTime>,

    /// Skip-list and junk patterns.
    #[builder(default)]
    #[serde(default)]
    pub rules: FilterRules,
}

fn default_large_threshold() -> u64 {
    DEFAULT_LARGE_THRESHOLD
}

fn default_old_days() -> u32 {
    DEFAULT_OLD_DAYS
}

fn default_min_duplicate_size() -> u64 {
    1024
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            large_threshold: DEFAULT_LARGE_THRESHOLD,
            old_threshold_days: DEFAULT_OLD_DAYS,
            hash_mode: HashMode::Quick,
            min_duplicate_size: 1024,
            threads: 0,
            reference_time: None,
            rules: FilterRules::default(),
        }
    }

    /// Check the parts of the config that do not touch the filesystem.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.root.as_os_str().is_empty() {
            return Err(ScanError::InvalidConfig {
                message: "Root path cannot be empty".to_string(),
            });
        }
        self.old_cutoff(self.reference_time.unwrap_or_else(SystemTime::now))?;
        Ok(())
    }

    /// Age threshold as a duration.
    pub fn old_threshold(&self) -> Duration {
        Duration::from_secs(u64::from(self.old_threshold_days) * SECS_PER_DAY)
    }

    /// Files modified strictly before the returned instant are old.
    pub fn old_cutoff(&self, now: SystemTime) -> Result<SystemTime, ScanError> {
        now.checked_sub(self.old_threshold())
            .ok_or_else(|| ScanError::InvalidConfig {
                message: format!(
                    "Old-file threshold of {} days reaches before the system clock epoch",
                    self.old_threshold_days
                ),
            })
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/home/user")
            .threads(4usize)
            .large_threshold(500u64 * 1024 * 1024)
            .old_threshold_days(30u32)
            .hash_mode(HashMode::Full)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.threads, 4);
        assert_eq!(config.large_threshold, 500 * 1024 * 1024);
        assert_eq!(config.old_threshold_days, 30);
        assert_eq!(config.hash_mode, HashMode::Full);
        assert_eq!(config.min_duplicate_size, 1024);
    }

    #[test]
    fn test_builder_requires_root() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_config_simple() {
        let config = ScanConfig::new("/home/user");
        assert_eq!(config.large_threshold, DEFAULT_LARGE_THRESHOLD);
        assert_eq!(config.old_threshold_days, 120);
        assert_eq!(config.hash_mode, HashMode::Quick);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_old_cutoff() {
        let config = ScanConfig::builder()
            .root("/test")
            .old_threshold_days(2u32)
            .build()
            .unwrap();

        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10 * SECS_PER_DAY);
        let cutoff = config.old_cutoff(now).unwrap();
        assert_eq!(cutoff, SystemTime::UNIX_EPOCH + Duration::from_secs(8 * SECS_PER_DAY));
    }

    #[test]
    fn test_old_cutoff_underflow_is_config_error() {
        let mut config = ScanConfig::new("/test");
        config.old_threshold_days = u32::MAX;
        config.reference_time = Some(SystemTime::UNIX_EPOCH);

        assert!(matches!(
            config.validate(),
            Err(ScanError::InvalidConfig { .. })
        ));
    }
}
