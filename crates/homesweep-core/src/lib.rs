//! Core types and traits for homesweep.
//!
//! This crate provides the fundamental data structures shared by the
//! scanner, the analyzers and the CLI: file records, cleanup categories,
//! path filter rules, scan configuration and error types.

mod category;
mod config;
mod error;
mod filter;
mod record;
mod settings;
mod stats;

pub use category::Category;
pub use config::{HashMode, ScanConfig, ScanConfigBuilder, DEFAULT_LARGE_THRESHOLD, DEFAULT_OLD_DAYS};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use filter::{FilterRules, PathFilter};
pub use record::{Fingerprint, FileRecord};
pub use settings::Settings;
pub use stats::ScanStats;
