//! Disposal of cleanup candidates for homesweep.
//!
//! Removes the paths a category lists, either by unlinking them, by moving
//! them to the platform trash, or by moving them into a backup directory
//! that mirrors their original layout. Progress is reported through a tokio
//! channel, one message per item, followed by a final summary.

mod disposal;
mod operation;
mod progress;

pub use disposal::{backup_target, dispose_blocking, dispose_item, start_disposal, DisposalResult};
pub use operation::{DisposalMode, OperationError};
pub use progress::{OperationComplete, OperationProgress};

/// Default channel buffer size for disposal progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
