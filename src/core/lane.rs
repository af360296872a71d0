//! Lane bookkeeping: the FIFO queue of one kind, its processor lifecycle,
//! and the counters the status snapshot is built from.
//!
//! Everything here lives behind the single scheduler mutex in [`Shared`].
//! Nothing in this module blocks or calls out; callers hold the lock only
//! for these brief updates.

use std::collections::{HashMap, VecDeque};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use super::operation::{Operation, OperationDescriptor, OperationKind};
use super::status::{AccountActivity, ProcessorState, StatusSnapshot};

/// Queue and processor state for one operation kind.
#[derive(Debug)]
pub(crate) struct Lane {
    pending: VecDeque<Operation>,
    processor: ProcessorState,
    worker: Option<JoinHandle<()>>,
    current: Option<OperationDescriptor>,
    total_queued: u64,
    completed: u64,
    spawns: u64,
}

impl Lane {
    pub(crate) const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            processor: ProcessorState::Dormant,
            worker: None,
            current: None,
            total_queued: 0,
            completed: 0,
            spawns: 0,
        }
    }

    /// Append at the tail.
    pub(crate) fn push(&mut self, operation: Operation) {
        self.pending.push_back(operation);
        self.total_queued += 1;
    }

    /// Remove the head. Only the lane's processor calls this.
    pub(crate) fn pop_front(&mut self) -> Option<Operation> {
        self.pending.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) const fn processor(&self) -> ProcessorState {
        self.processor
    }

    pub(crate) const fn is_dormant(&self) -> bool {
        matches!(self.processor, ProcessorState::Dormant)
    }

    /// Dormant -> Running with a freshly spawned worker.
    pub(crate) fn attach(&mut self, worker: JoinHandle<()>) {
        debug_assert!(self.is_dormant(), "processor already attached");
        self.processor = ProcessorState::Running;
        self.worker = Some(worker);
        self.spawns += 1;
    }

    /// Running -> Terminating. Hands back the worker handle so the caller
    /// can join it outside the lock.
    pub(crate) fn terminate(&mut self) -> Option<JoinHandle<()>> {
        if self.processor == ProcessorState::Running {
            self.processor = ProcessorState::Terminating;
        }
        self.worker.take()
    }

    /// Teardown run by the worker itself on its way out: back to Dormant.
    /// Its own handle, if still held, is dropped (the thread is finishing).
    pub(crate) fn retire(&mut self) {
        self.processor = ProcessorState::Dormant;
        self.current = None;
        drop(self.worker.take());
    }

    pub(crate) fn begin(&mut self, descriptor: OperationDescriptor) {
        self.current = Some(descriptor);
    }

    pub(crate) fn finish(&mut self) {
        self.current = None;
        self.completed += 1;
    }

    pub(crate) const fn current(&self) -> Option<&OperationDescriptor> {
        self.current.as_ref()
    }

    pub(crate) const fn total_queued(&self) -> u64 {
        self.total_queued
    }

    pub(crate) const fn completed(&self) -> u64 {
        self.completed
    }

    pub(crate) const fn spawns(&self) -> u64 {
        self.spawns
    }

    const fn is_active(&self) -> bool {
        !matches!(self.processor, ProcessorState::Dormant)
    }
}

/// All mutable scheduler state, guarded by one mutex.
#[derive(Debug)]
pub(crate) struct SchedulerState {
    post: Lane,
    renew: Lane,
    accounts: HashMap<String, AccountActivity>,
    last_activity_ms: Option<u128>,
    shutdown: bool,
}

impl SchedulerState {
    pub(crate) fn new() -> Self {
        Self {
            post: Lane::new(),
            renew: Lane::new(),
            accounts: HashMap::new(),
            last_activity_ms: None,
            shutdown: false,
        }
    }

    pub(crate) const fn lane(&self, kind: OperationKind) -> &Lane {
        match kind {
            OperationKind::Post => &self.post,
            OperationKind::Renew => &self.renew,
        }
    }

    pub(crate) fn lane_mut(&mut self, kind: OperationKind) -> &mut Lane {
        match kind {
            OperationKind::Post => &mut self.post,
            OperationKind::Renew => &mut self.renew,
        }
    }

    /// Insert-if-absent, then count the enqueue against the account.
    pub(crate) fn note_queued(&mut self, account: &str, kind: OperationKind, now_ms: u128) {
        self.accounts
            .entry(account.to_string())
            .or_default()
            .record_queued(kind, now_ms);
    }

    pub(crate) fn note_started(&mut self, account: &str, now_ms: u128) {
        self.last_activity_ms = Some(now_ms);
        if let Some(activity) = self.accounts.get_mut(account) {
            activity.last_activity_ms = Some(now_ms);
        }
    }

    pub(crate) fn note_completed(&mut self, account: &str, kind: OperationKind) {
        self.lane_mut(kind).finish();
        if let Some(activity) = self.accounts.get_mut(account) {
            activity.record_completed(kind);
        }
    }

    /// Pure read; never creates an entry.
    pub(crate) fn account(&self, account: &str) -> Option<&AccountActivity> {
        self.accounts.get(account)
    }

    pub(crate) const fn is_shut_down(&self) -> bool {
        self.shutdown
    }

    /// Flip the shutdown flag. Returns false if it was already set.
    pub(crate) fn begin_shutdown(&mut self) -> bool {
        !std::mem::replace(&mut self.shutdown, true)
    }

    pub(crate) fn snapshot(&self) -> StatusSnapshot {
        let post_queue_size = self.post.len();
        let renew_queue_size = self.renew.len();
        StatusSnapshot {
            post_active: self.post.is_active(),
            renew_active: self.renew.is_active(),
            current_post_operation: self.post.current().cloned(),
            current_renew_operation: self.renew.current().cloned(),
            total_posts_queued: self.post.total_queued(),
            total_renews_queued: self.renew.total_queued(),
            posts_completed: self.post.completed(),
            renews_completed: self.renew.completed(),
            post_queue_size,
            renew_queue_size,
            total_queue_size: post_queue_size + renew_queue_size,
            post_processor_spawns: self.post.spawns(),
            renew_processor_spawns: self.renew.spawns(),
            last_activity_ms: self.last_activity_ms,
        }
    }
}

/// State shared between the facade and its processors.
///
/// The condvar is signalled on shutdown so a processor sleeping through its
/// inter-operation delay wakes immediately.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: Mutex<SchedulerState>,
    pub(crate) wake: Condvar,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SchedulerState::new()),
            wake: Condvar::new(),
        }
    }
}
