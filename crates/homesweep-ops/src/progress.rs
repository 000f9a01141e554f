//! Progress reporting types for disposal.

use std::path::PathBuf;

use crate::OperationError;

/// Progress information for an ongoing disposal.
#[derive(Debug, Clone)]
pub struct OperationProgress {
    /// Number of items handled, successful or not.
    pub items_completed: usize,
    /// Total number of items to process.
    pub items_total: usize,
    /// Bytes freed so far.
    pub bytes_processed: u64,
    /// The item handled last.
    pub current_file: Option<PathBuf>,
    /// Errors encountered so far.
    pub errors: Vec<OperationError>,
}

impl OperationProgress {
    /// Create a new progress tracker.
    pub fn new(items_total: usize) -> Self {
        Self {
            items_completed: 0,
            items_total,
            bytes_processed: 0,
            current_file: None,
            errors: Vec::new(),
        }
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.items_total > 0 {
            (self.items_completed as f64 / self.items_total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Number of items that succeeded so far.
    pub fn succeeded(&self) -> usize {
        self.items_completed - self.errors.len()
    }

    /// Record a successfully disposed item.
    pub fn complete_item(&mut self, path: PathBuf, bytes: u64) {
        self.items_completed += 1;
        self.bytes_processed += bytes;
        self.current_file = Some(path);
    }

    /// Record a failed item.
    pub fn fail_item(&mut self, error: OperationError) {
        self.items_completed += 1;
        self.current_file = Some(error.path.clone());
        self.errors.push(error);
    }

    /// Final result of the run so far.
    pub fn finish(self) -> OperationComplete {
        OperationComplete {
            succeeded: self.succeeded(),
            failed: self.errors.len(),
            bytes_processed: self.bytes_processed,
            errors: self.errors,
        }
    }
}

/// Result of a completed disposal.
#[derive(Debug, Clone, Default)]
pub struct OperationComplete {
    /// Number of items successfully processed.
    pub succeeded: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Total bytes freed.
    pub bytes_processed: u64,
    /// Errors that occurred.
    pub errors: Vec<OperationError>,
}

impl OperationComplete {
    /// Check if the disposal was fully successful.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_accounting() {
        let mut progress = OperationProgress::new(4);
        progress.complete_item(PathBuf::from("/a"), 10);
        progress.fail_item(OperationError::new("/b", "busy"));
        assert_eq!(progress.percentage(), 50.0);
        assert_eq!(progress.succeeded(), 1);
        assert_eq!(progress.current_file.as_deref(), Some(std::path::Path::new("/b")));

        let complete = progress.finish();
        assert_eq!(complete.succeeded, 1);
        assert_eq!(complete.failed, 1);
        assert_eq!(complete.bytes_processed, 10);
        assert!(!complete.is_success());
    }
}
