//! Outcome sinks.
//!
//! Every executed operation produces one [`OperationRecord`]. The scheduler
//! keeps no history itself; a sink lets collaborators (analytics, admin
//! screens, tests) observe results without touching the lanes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::{OperationDescriptor, OperationKind};

/// How an executed operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum OperationResult {
    /// Executor reported success.
    Succeeded(String),
    /// Executor returned normally but reported failure.
    Failed(String),
    /// Executor returned an error or panicked.
    Crashed(String),
}

impl OperationResult {
    /// True for [`OperationResult::Crashed`].
    #[must_use]
    pub const fn is_crash(&self) -> bool {
        matches!(self, Self::Crashed(_))
    }
}

/// One executed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Operation id.
    pub id: Uuid,
    /// Lane.
    pub kind: OperationKind,
    /// Account.
    pub account: String,
    /// Enqueue time (ms since epoch).
    pub enqueued_at_ms: u128,
    /// Executor start time (ms since epoch).
    pub started_at_ms: u128,
    /// Executor return time (ms since epoch).
    pub finished_at_ms: u128,
    /// How it ended.
    pub result: OperationResult,
}

impl OperationRecord {
    pub(crate) fn new(
        descriptor: OperationDescriptor,
        finished_at_ms: u128,
        result: OperationResult,
    ) -> Self {
        Self {
            id: descriptor.id,
            kind: descriptor.kind,
            account: descriptor.account,
            enqueued_at_ms: descriptor.enqueued_at_ms,
            started_at_ms: descriptor.started_at_ms,
            finished_at_ms,
            result,
        }
    }

    /// Time spent inside the executor.
    #[must_use]
    pub const fn duration_ms(&self) -> u128 {
        self.finished_at_ms.saturating_sub(self.started_at_ms)
    }
}

/// Receiver of operation records. Called from processor threads, outside
/// the scheduler lock.
pub trait OutcomeSink: Send + Sync {
    /// Record an executed operation.
    fn record(&self, record: OperationRecord);
}

/// In-memory sink keeping the most recent records, for dashboards and tests.
///
/// Clones share the same buffer, so a handle can be kept after passing a
/// clone to the scheduler.
#[derive(Clone)]
pub struct InMemoryOutcomeSink {
    records: Arc<Mutex<VecDeque<OperationRecord>>>,
    max_records: usize,
}

impl InMemoryOutcomeSink {
    /// Create a sink with a bounded buffer; the oldest record is evicted first.
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(max_records.min(1024)))),
            max_records,
        }
    }

    /// Snapshot of stored records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Stored records for one lane, oldest first.
    #[must_use]
    pub fn records_for(&self, kind: OperationKind) -> Vec<OperationRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl OutcomeSink for InMemoryOutcomeSink {
    fn record(&self, record: OperationRecord) {
        if self.max_records == 0 {
            return;
        }
        let mut records = self.records.lock();
        if records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(record);
    }
}
