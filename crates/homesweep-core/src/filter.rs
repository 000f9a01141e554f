//! Directory skip-list and junk file matching.
//!
//! [`FilterRules`] is plain, serializable data: the built-in lists plus
//! whatever the user adds in their settings file. [`PathFilter`] is the
//! compiled form with constant-time lookups that the walker consults.

use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::path::{Component, Path};

use compact_str::CompactString;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

const DEFAULT_SKIP_DIRS: &[&str] = &[
    "Library",
    "Applications",
    ".git",
    "node_modules",
    ".ssh",
    ".config",
    ".Trash",
    ".npm",
    ".cargo",
    ".rustup",
    ".pyenv",
    ".nvm",
    ".rbenv",
    ".local",
    ".cache",
    ".vscode",
    ".idea",
    "venv",
    ".venv",
    "__pycache__",
    ".gradle",
    ".m2",
    ".docker",
    "Movies",
    "Music",
    "Pictures",
    "Photos Library.photoslibrary",
];

const DEFAULT_JUNK_NAMES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    ".localized",
    ".CFUserTextEncoding",
    ".Spotlight-V100",
    ".fseventsd",
];

const DEFAULT_JUNK_EXTENSIONS: &[&str] = &["tmp", "temp", "log", "bak", "old", "swp", "swo"];

/// Editor lock files, AppleDouble resource forks, Office owner files.
const DEFAULT_JUNK_PREFIXES: &[&str] = &["._", "~$", ".~"];

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn compact_set(items: &BTreeSet<String>) -> HashSet<CompactString> {
    items.iter().map(|s| CompactString::from(s.as_str())).collect()
}

/// Raw skip and junk patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Directory names whose whole subtree is ignored.
    pub skip_dirs: BTreeSet<String>,
    /// Exact file names that are junk.
    pub junk_names: BTreeSet<String>,
    /// Extensions (case-insensitive, without the dot) that mark junk.
    pub junk_extensions: BTreeSet<String>,
    /// File name prefixes that mark junk.
    pub junk_prefixes: BTreeSet<String>,
    /// Glob patterns matched against the file name that mark junk.
    pub junk_globs: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            skip_dirs: to_set(DEFAULT_SKIP_DIRS),
            junk_names: to_set(DEFAULT_JUNK_NAMES),
            junk_extensions: to_set(DEFAULT_JUNK_EXTENSIONS),
            junk_prefixes: to_set(DEFAULT_JUNK_PREFIXES),
            junk_globs: Vec::new(),
        }
    }
}

impl FilterRules {
    /// Rules that match nothing.
    pub fn empty() -> Self {
        Self {
            skip_dirs: BTreeSet::new(),
            junk_names: BTreeSet::new(),
            junk_extensions: BTreeSet::new(),
            junk_prefixes: BTreeSet::new(),
            junk_globs: Vec::new(),
        }
    }

    /// Add every pattern of `other` to these rules.
    pub fn merge(&mut self, other: &FilterRules) {
        self.skip_dirs.extend(other.skip_dirs.iter().cloned());
        self.junk_names.extend(other.junk_names.iter().cloned());
        self.junk_extensions.extend(other.junk_extensions.iter().cloned());
        self.junk_prefixes.extend(other.junk_prefixes.iter().cloned());
        for glob in &other.junk_globs {
            if !self.junk_globs.contains(glob) {
                self.junk_globs.push(glob.clone());
            }
        }
    }
}

/// Compiled path predicates. Pure; no filesystem access.
#[derive(Debug, Clone)]
pub struct PathFilter {
    skip_dirs: HashSet<CompactString>,
    junk_names: HashSet<CompactString>,
    junk_extensions: HashSet<CompactString>,
    junk_prefixes: Vec<CompactString>,
    junk_globs: Option<GlobSet>,
}

impl PathFilter {
    /// Compile a set of rules.
    pub fn new(rules: &FilterRules) -> Result<Self, ScanError> {
        let junk_globs = if rules.junk_globs.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &rules.junk_globs {
                let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                builder.add(glob);
            }
            let set = builder.build().map_err(|e| ScanError::InvalidPattern {
                pattern: rules.junk_globs.join(", "),
                message: e.to_string(),
            })?;
            Some(set)
        };

        Ok(Self {
            skip_dirs: compact_set(&rules.skip_dirs),
            junk_names: compact_set(&rules.junk_names),
            junk_extensions: rules
                .junk_extensions
                .iter()
                .map(|ext| CompactString::from(ext.trim_start_matches('.').to_lowercase()))
                .collect(),
            junk_prefixes: rules
                .junk_prefixes
                .iter()
                .map(|p| CompactString::from(p.as_str()))
                .collect(),
            junk_globs,
        })
    }

    /// True if any segment of `path` is a skip-listed directory name.
    pub fn should_skip(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => self.is_skipped_name(name),
            _ => false,
        })
    }

    /// True if a single directory name is skip-listed.
    pub fn is_skipped_name(&self, name: &OsStr) -> bool {
        self.skip_dirs.contains(name.to_string_lossy().as_ref())
    }

    /// True if the file name marks `path` as junk.
    pub fn is_junk(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();

        if self.junk_names.contains(name.as_ref()) {
            return true;
        }

        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if self.junk_extensions.contains(ext.as_str()) {
                return true;
            }
        }

        if self.junk_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return true;
        }

        self.junk_globs
            .as_ref()
            .is_some_and(|set| set.is_match(name.as_ref()))
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        // The built-in rules carry no globs, so compilation cannot fail.
        let rules = FilterRules::default();
        Self {
            skip_dirs: compact_set(&rules.skip_dirs),
            junk_names: compact_set(&rules.junk_names),
            junk_extensions: compact_set(&rules.junk_extensions),
            junk_prefixes: rules
                .junk_prefixes
                .iter()
                .map(|p| CompactString::from(p.as_str()))
                .collect(),
            junk_globs: None,
        }
    }
}
