//! Sequential processor: the single worker that drains one lane.
//!
//! A processor is an OS thread with its own single-threaded tokio runtime.
//! It pops the head of its lane under the scheduler lock, releases the lock,
//! and blocks on the executor until it returns. The next operation of the
//! lane never starts before the current one has finished. When the lane is
//! empty (or shutdown was requested) the worker retires the lane to Dormant
//! itself and exits; the facade spawns a fresh one on the next enqueue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::util::clock::now_ms;

use super::executor::{dispatch, ListingExecutor};
use super::lane::Shared;
use super::operation::{Operation, OperationDescriptor, OperationKind};
use super::outcome::{OperationRecord, OperationResult, OutcomeSink};

/// Everything a worker needs to drain its lane.
pub(crate) struct Processor<E: ListingExecutor> {
    pub(crate) kind: OperationKind,
    pub(crate) shared: Arc<Shared>,
    pub(crate) executor: Arc<E>,
    pub(crate) config: Arc<SchedulerConfig>,
    pub(crate) sink: Option<Arc<dyn OutcomeSink>>,
}

impl<E: ListingExecutor> Processor<E> {
    /// Start the worker thread.
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("{}-lane", self.kind))
            .stack_size(self.config.thread_stack_size)
            .spawn(move || self.run())
    }

    fn run(self) {
        let kind = self.kind;
        debug!(kind = %kind, "processor thread started");

        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(kind = %kind, error = %e, "failed to create processor runtime");
                // Leave the queue intact; the next enqueue spawns a new worker.
                self.shared.state.lock().lane_mut(kind).retire();
                return;
            }
        };

        let mut executed: u64 = 0;
        while let Some((operation, descriptor)) = self.next_operation() {
            let result = rt.block_on(self.execute(operation, &descriptor));
            self.complete(descriptor, result);
            executed += 1;
            self.pause();
        }

        info!(kind = %kind, executed, "processor finished");
    }

    /// Pop the head of the lane, or retire the lane if it is empty or the
    /// scheduler is shutting down.
    fn next_operation(&self) -> Option<(Operation, OperationDescriptor)> {
        let kind = self.kind;
        let mut state = self.shared.state.lock();

        if state.is_shut_down() {
            let abandoned = state.lane(kind).len();
            state.lane_mut(kind).retire();
            debug!(kind = %kind, abandoned, "processor stopping for shutdown");
            return None;
        }

        let Some(operation) = state.lane_mut(kind).pop_front() else {
            state.lane_mut(kind).retire();
            debug!(kind = %kind, "queue drained, processor going dormant");
            return None;
        };

        let started_at_ms = now_ms();
        let descriptor = operation.describe(started_at_ms);
        state.lane_mut(kind).begin(descriptor.clone());
        state.note_started(operation.account(), started_at_ms);

        info!(
            kind = %kind,
            account = %operation.account(),
            operation_id = %operation.id(),
            remaining = state.lane(kind).len(),
            "processing operation"
        );
        Some((operation, descriptor))
    }

    /// Run the executor to completion. Errors and panics are contained here
    /// so they never reach the loop.
    async fn execute(
        &self,
        operation: Operation,
        descriptor: &OperationDescriptor,
    ) -> OperationResult {
        let executor = Arc::clone(&self.executor);
        let config = Arc::clone(&self.config);
        let task = tokio::spawn(async move {
            dispatch(executor.as_ref(), &operation, &config.automation).await
        });

        match task.await {
            Ok(Ok(outcome)) if outcome.success() => {
                debug!(
                    kind = %descriptor.kind,
                    account = %descriptor.account,
                    message = outcome.message(),
                    "operation succeeded"
                );
                OperationResult::Succeeded(outcome.message().to_string())
            }
            Ok(Ok(outcome)) => {
                warn!(
                    kind = %descriptor.kind,
                    account = %descriptor.account,
                    message = outcome.message(),
                    "executor reported failure"
                );
                OperationResult::Failed(outcome.message().to_string())
            }
            Ok(Err(e)) => {
                error!(
                    kind = %descriptor.kind,
                    account = %descriptor.account,
                    operation_id = %descriptor.id,
                    error = %e,
                    "executor crashed, dropping operation"
                );
                OperationResult::Crashed(e.to_string())
            }
            Err(e) => {
                let reason = join_error_reason(e);
                error!(
                    kind = %descriptor.kind,
                    account = %descriptor.account,
                    operation_id = %descriptor.id,
                    reason = %reason,
                    "executor crashed, dropping operation"
                );
                OperationResult::Crashed(reason)
            }
        }
    }

    /// Hand the record to the sink, then count the attempt. Crashes count too.
    /// A panicking sink loses its record but never takes the worker down.
    fn complete(&self, descriptor: OperationDescriptor, result: OperationResult) {
        let finished_at_ms = now_ms();
        let account = descriptor.account.clone();

        if let Some(sink) = &self.sink {
            let operation_id = descriptor.id;
            let record = OperationRecord::new(descriptor, finished_at_ms, result);
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink.record(record))) {
                error!(
                    kind = %self.kind,
                    account = %account,
                    operation_id = %operation_id,
                    reason = %panic_message(payload.as_ref()).unwrap_or("unknown"),
                    "outcome sink panicked, record dropped"
                );
            }
        }

        self.shared.state.lock().note_completed(&account, self.kind);
    }

    /// Throttle between operations. Cut short by shutdown.
    fn pause(&self) {
        let delay = self.config.inter_operation_delay();
        if delay.is_zero() {
            return;
        }
        let deadline = Instant::now() + delay;
        let mut state = self.shared.state.lock();
        while !state.is_shut_down() {
            if self.shared.wake.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
    }
}

fn join_error_reason(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => panic_message(payload.as_ref()).map_or_else(
            || "executor panicked".to_string(),
            |m| format!("executor panicked: {m}"),
        ),
        Err(err) => err.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

/// Join a processor thread, giving up after `timeout`. A thread that is
/// still inside a long executor call is detached rather than waited on.
pub(crate) fn join_with_timeout(kind: OperationKind, worker: JoinHandle<()>, timeout: Duration) {
    let (tx, rx) = bounded(1);
    let joiner = match thread::Builder::new()
        .name(format!("{kind}-lane-join"))
        .spawn(move || {
            let _ = tx.send(worker.join().is_ok());
        }) {
        Ok(joiner) => joiner,
        Err(e) => {
            warn!(kind = %kind, error = %e, "could not join processor, detaching");
            return;
        }
    };

    match rx.recv_timeout(timeout) {
        Ok(true) => debug!(kind = %kind, "processor joined"),
        Ok(false) => warn!(kind = %kind, "processor thread panicked"),
        Err(_) => {
            warn!(kind = %kind, "processor did not exit within timeout, detaching");
            return;
        }
    }
    let _ = joiner.join();
}
