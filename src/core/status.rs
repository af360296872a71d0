//! Status snapshots handed to callers for polling and monitoring.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::{OperationDescriptor, OperationKind};

/// Lifecycle of the processor bound to one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorState {
    /// No worker exists; the next enqueue spawns one.
    Dormant,
    /// A worker is draining the lane.
    Running,
    /// Shutdown was requested; the worker exits after its in-flight operation.
    Terminating,
}

/// Point-in-time copy of the scheduler's shared counters and flags.
///
/// System-wide: the same snapshot is returned whichever account asks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Post processor is draining its queue.
    pub post_active: bool,
    /// Renew processor is draining its queue.
    pub renew_active: bool,
    /// Post operation currently inside the executor.
    pub current_post_operation: Option<OperationDescriptor>,
    /// Renew operation currently inside the executor.
    pub current_renew_operation: Option<OperationDescriptor>,
    /// Post operations ever enqueued.
    pub total_posts_queued: u64,
    /// Renew operations ever enqueued.
    pub total_renews_queued: u64,
    /// Post operations drained from the queue and executed, including crashes.
    pub posts_completed: u64,
    /// Renew operations drained from the queue and executed, including crashes.
    pub renews_completed: u64,
    /// Post operations waiting to start.
    pub post_queue_size: usize,
    /// Renew operations waiting to start.
    pub renew_queue_size: usize,
    /// Sum of both queue sizes.
    pub total_queue_size: usize,
    /// Post processors started since the scheduler was created.
    pub post_processor_spawns: u64,
    /// Renew processors started since the scheduler was created.
    pub renew_processor_spawns: u64,
    /// Last time a processor started an operation (ms since epoch).
    pub last_activity_ms: Option<u128>,
}

impl StatusSnapshot {
    /// Whether the lane for `kind` has an active processor.
    #[must_use]
    pub const fn is_active(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::Post => self.post_active,
            OperationKind::Renew => self.renew_active,
        }
    }

    /// Completed count for `kind`.
    #[must_use]
    pub const fn completed(&self, kind: OperationKind) -> u64 {
        match kind {
            OperationKind::Post => self.posts_completed,
            OperationKind::Renew => self.renews_completed,
        }
    }

    /// Whether both lanes are idle with nothing waiting.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !self.post_active && !self.renew_active && self.total_queue_size == 0
    }
}

/// Per-account counters kept alongside the system-wide status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivity {
    /// Post operations enqueued for this account.
    pub posts_queued: u64,
    /// Renew operations enqueued for this account.
    pub renews_queued: u64,
    /// Post operations executed for this account.
    pub posts_completed: u64,
    /// Renew operations executed for this account.
    pub renews_completed: u64,
    /// Last enqueue or start for this account (ms since epoch).
    pub last_activity_ms: Option<u128>,
}

impl AccountActivity {
    pub(crate) fn record_queued(&mut self, kind: OperationKind, now_ms: u128) {
        match kind {
            OperationKind::Post => self.posts_queued += 1,
            OperationKind::Renew => self.renews_queued += 1,
        }
        self.last_activity_ms = Some(now_ms);
    }

    pub(crate) fn record_completed(&mut self, kind: OperationKind) {
        match kind {
            OperationKind::Post => self.posts_completed += 1,
            OperationKind::Renew => self.renews_completed += 1,
        }
    }

    /// Operations enqueued for this account but not yet executed.
    #[must_use]
    pub const fn outstanding(&self) -> u64 {
        (self.posts_queued + self.renews_queued)
            .saturating_sub(self.posts_completed + self.renews_completed)
    }
}

/// Acknowledgement returned by every enqueue call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueAck {
    /// Id assigned to the new operation.
    pub operation_id: Uuid,
    /// Lane the operation joined.
    pub kind: OperationKind,
    /// Human-readable confirmation.
    pub message: String,
    /// Status right after the append.
    pub status: StatusSnapshot,
}
