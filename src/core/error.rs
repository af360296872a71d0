//! Error types for scheduler operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the scheduler facade.
///
/// Enqueueing is otherwise accept-always: payloads are not validated here,
/// and bad ones surface later as executor failures.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The scheduler has been shut down and accepts no more operations.
    #[error("scheduler is shut down")]
    ShutDown,
    /// A processor thread could not be started. The operation identified
    /// by `operation_id` is already queued and must not be resubmitted; the
    /// next enqueue of the same kind retries the spawn.
    #[error("operation {operation_id} queued but processor failed to start: {reason}")]
    WorkerSpawn {
        /// Id of the operation that was queued.
        operation_id: Uuid,
        /// OS error reported by the thread builder.
        reason: String,
    },
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
