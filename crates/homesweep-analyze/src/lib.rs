//! Classification and duplicate detection for homesweep.
//!
//! This crate turns a walked tree into a [`ScanResult`]:
//!
//! - **Fingerprinting** - BLAKE3 over the whole file, or a head + tail + size
//!   sample for large files in quick mode
//! - **Duplicate detection** - size buckets, then fingerprints, newest copy kept
//! - **Reporting** - per-category counts, sorted items and reclaimable bytes
//!
//! # Scanning
//!
//! ```rust,no_run
//! use homesweep_analyze::{Category, scan};
//!
//! let result = scan("/home/user", 100 * 1024 * 1024, 120).unwrap();
//!
//! let dups = result.category(Category::Duplicates);
//! println!("{} duplicate groups, {} bytes reclaimable", dups.count, dups.total_bytes);
//!
//! for path in result.files_to_remove(Category::JunkFiles) {
//!     println!("junk: {}", path.display());
//! }
//! ```
//!
//! For progress, cancellation or custom rules, build a
//! [`ScanConfig`] and run it through a [`Sweeper`].

mod age;
mod duplicates;
mod fingerprint;
mod report;
mod sweep;

pub use age::{age_of, format_age};
pub use duplicates::{
    DuplicateConfig, DuplicateConfigBuilder, DuplicateGroup, DuplicateResolver, DuplicateSets,
    HashProgress,
};
pub use fingerprint::{fingerprint_file, SAMPLE_SIZE, SAMPLE_THRESHOLD};
pub use report::{CategoryItem, CategorySummary, ScanResult};
pub use sweep::{scan, Sweeper};

// Re-export core types
pub use homesweep_core::{Category, FileRecord, Fingerprint, HashMode, ScanConfig, ScanError};
