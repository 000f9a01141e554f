//! Delete, trash or back up a list of paths, with progress over a channel.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::sync::mpsc;

use crate::operation::{DisposalMode, OperationError};
use crate::progress::{OperationComplete, OperationProgress};
use crate::OPERATION_CHANNEL_SIZE;

/// Message sent through the channel during a disposal.
#[derive(Debug)]
pub enum DisposalResult {
    /// Sent after every item.
    Progress(OperationProgress),
    /// The run finished.
    Complete(OperationComplete),
}

/// Dispose of `paths` on a background task.
///
/// Must be called from within a tokio runtime.
pub fn start_disposal(paths: Vec<PathBuf>, mode: DisposalMode) -> mpsc::Receiver<DisposalResult> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    tokio::spawn(async move {
        let mut progress = OperationProgress::new(paths.len());

        for path in paths {
            let item_mode = mode.clone();
            let item_path = path.clone();
            let result =
                tokio::task::spawn_blocking(move || dispose_item(&item_path, &item_mode)).await;

            match result {
                Ok(Ok(bytes)) => progress.complete_item(path, bytes),
                Ok(Err(err)) => progress.fail_item(err),
                Err(e) => progress.fail_item(OperationError::new(path, format!("Task failed: {e}"))),
            }

            let _ = tx.send(DisposalResult::Progress(progress.clone())).await;
        }

        let _ = tx.send(DisposalResult::Complete(progress.finish())).await;
    });

    rx
}

/// Dispose of `paths` on the current thread.
pub fn dispose_blocking(paths: &[PathBuf], mode: &DisposalMode) -> OperationComplete {
    let mut progress = OperationProgress::new(paths.len());
    for path in paths {
        match dispose_item(path, mode) {
            Ok(bytes) => progress.complete_item(path.clone(), bytes),
            Err(err) => progress.fail_item(err),
        }
    }
    progress.finish()
}

/// Dispose of one path and return the bytes it freed.
///
/// A path that no longer exists counts as done.
pub fn dispose_item(path: &Path, mode: &DisposalMode) -> Result<u64, OperationError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(OperationError::new(path, e.to_string())),
    };
    let is_dir = metadata.is_dir();
    let size = if is_dir { 0 } else { metadata.len() };

    let outcome = match mode {
        DisposalMode::Delete if is_dir => fs::remove_dir(path).map_err(|e| e.to_string()),
        DisposalMode::Delete => fs::remove_file(path).map_err(|e| e.to_string()),
        DisposalMode::Trash => ensure_empty_dir(path, is_dir)
            .and_then(|()| trash::delete(path).map_err(|e| e.to_string())),
        DisposalMode::Backup { backup_dir, base } => ensure_empty_dir(path, is_dir)
            .and_then(|()| {
                let target = available_target(&backup_target(backup_dir, base, path));
                move_item(path, &target, is_dir)
            }),
    };

    match outcome {
        Ok(()) => {
            tracing::debug!(path = %path.display(), bytes = size, "Disposed");
            Ok(size)
        }
        Err(message) => {
            tracing::warn!(path = %path.display(), "Disposal failed: {message}");
            Err(OperationError::new(path, message))
        }
    }
}

/// Trash and backup move whole subtrees, so directories must already be
/// empty, the same as `remove_dir` requires.
fn ensure_empty_dir(path: &Path, is_dir: bool) -> Result<(), String> {
    if !is_dir {
        return Ok(());
    }
    let mut entries = fs::read_dir(path).map_err(|e| e.to_string())?;
    match entries.next() {
        None => Ok(()),
        Some(_) => Err("Directory not empty".to_string()),
    }
}

/// Where backup mode puts `path`.
///
/// Paths outside `base` keep all of their components below the backup root.
pub fn backup_target(backup_dir: &Path, base: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(relative) => backup_dir.join(relative),
        Err(_) => {
            let relative: PathBuf = path
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            backup_dir.join(relative)
        }
    }
}

/// `target`, or a timestamped (then numbered) sibling if it is taken.
fn available_target(target: &Path) -> PathBuf {
    if !exists(target) {
        return target.to_path_buf();
    }

    let parent = target.parent().unwrap_or(Path::new(""));
    let stem = target.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let suffix = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    let stamped = parent.join(format!("{stem}_{timestamp}{suffix}"));
    if !exists(&stamped) {
        return stamped;
    }

    let mut n = 1u32;
    loop {
        let numbered = parent.join(format!("{stem}_{timestamp}_{n}{suffix}"));
        if !exists(&numbered) {
            return numbered;
        }
        n += 1;
    }
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Rename, falling back to copy and remove across filesystems.
fn move_item(source: &Path, dest: &Path, is_dir: bool) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {e}"))?;
    }

    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    if is_dir {
        fs::create_dir(dest).map_err(|e| format!("Failed to create directory: {e}"))?;
        fs::remove_dir(source).map_err(|e| format!("Failed to remove source: {e}"))?;
    } else {
        fs::copy(source, dest).map_err(|e| format!("Failed to copy: {e}"))?;
        fs::remove_file(source).map_err(|e| format!("Failed to remove source: {e}"))?;
    }

    Ok(())
}
