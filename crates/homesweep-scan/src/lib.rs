//! Tree walking for homesweep.
//!
//! A single jwalk traversal that prunes skip-listed directories and sorts
//! regular files into the cheap cleanup buckets as it goes:
//!
//! - **Empty files** (size 0)
//! - **Junk files** (name, extension or prefix rules)
//! - **Large** and **old** files (independent; a file can be both)
//! - **Empty directories** (no retained children after pruning)
//!
//! Every non-empty, non-junk file also lands in the flat `records` list that
//! duplicate detection consumes.
//!
//! # Example
//!
//! ```rust,no_run
//! use homesweep_scan::{ScanConfig, TreeWalker};
//!
//! let walker = TreeWalker::new();
//! let output = walker.walk(&ScanConfig::new("/home/user")).unwrap();
//!
//! println!("{} junk files", output.junk_files.len());
//! println!("{} duplicate candidates", output.records.len());
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use homesweep_scan::TreeWalker;
//!
//! let walker = TreeWalker::new();
//! let mut progress_rx = walker.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("Visited {} files", progress.files_scanned);
//!     }
//! });
//! ```

mod progress;
mod walker;

pub use progress::ScanProgress;
pub use walker::{TreeWalker, WalkOutput};

// Re-export core types for convenience
pub use homesweep_core::{FileRecord, ScanConfig, ScanError, ScanStats, ScanWarning, WarningKind};
