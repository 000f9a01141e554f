//! Persistent user settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{HashMode, ScanConfig, DEFAULT_OLD_DAYS};
use crate::filter::FilterRules;

/// User preferences loaded from `settings.toml`.
///
/// Command line flags take precedence over these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Large file threshold in MiB.
    pub large_mb: u64,
    /// Old file threshold in days.
    pub old_days: u32,
    /// Fingerprint strategy.
    pub hash_mode: HashMode,
    /// Fingerprint worker threads (0 = auto-detect).
    pub threads: usize,
    /// Where backup mode moves files (default `~/.cleanup_backup`).
    pub backup_dir: Option<PathBuf>,
    /// Patterns added on top of the built-in skip and junk lists.
    #[serde(default = "FilterRules::empty")]
    pub extra_rules: FilterRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            large_mb: 100,
            old_days: DEFAULT_OLD_DAYS,
            hash_mode: HashMode::Quick,
            threads: 0,
            backup_dir: None,
            extra_rules: FilterRules::empty(),
        }
    }
}

impl Settings {
    /// Get the settings file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("homesweep").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file, or return defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %path.display(), "Ignoring unreadable settings: {err}");
                Self::default()
            }
        }
    }

    /// Backup directory, falling back to `~/.cleanup_backup`.
    pub fn backup_dir(&self) -> Option<PathBuf> {
        self.backup_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cleanup_backup")))
    }

    /// Large threshold in bytes.
    pub fn large_threshold(&self) -> u64 {
        self.large_mb.saturating_mul(1024 * 1024)
    }

    /// Scan config for `root` seeded from these settings.
    pub fn scan_config(&self, root: impl Into<PathBuf>) -> ScanConfig {
        let mut config = ScanConfig::new(root);
        config.large_threshold = self.large_threshold();
        config.old_threshold_days = self.old_days;
        config.hash_mode = self.hash_mode;
        config.threads = self.threads;
        config.rules.merge(&self.extra_rules);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp.path().join("nope.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_and_scan_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(
            &path,
            "large_mb = 500\nhash_mode = \"full\"\n\n[extra_rules]\nskip_dirs = [\"Dropbox\"]\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.large_mb, 500);
        assert_eq!(settings.old_days, DEFAULT_OLD_DAYS);
        assert_eq!(settings.hash_mode, HashMode::Full);

        let config = settings.scan_config("/home/user");
        assert_eq!(config.large_threshold, 500 * 1024 * 1024);
        assert!(config.rules.skip_dirs.contains("Dropbox"));
        assert!(config.rules.skip_dirs.contains(".git"));
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(&path, "large_mb = \"lots\"").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_serialized_settings_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        let settings = Settings {
            old_days: 30,
            backup_dir: Some(PathBuf::from("/backups")),
            ..Settings::default()
        };

        std::fs::write(&path, toml::to_string_pretty(&settings).unwrap()).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }
}
