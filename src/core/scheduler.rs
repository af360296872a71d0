//! Scheduler facade: the public entry points over the two lanes.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::util::clock::now_ms;

use super::error::SchedulerError;
use super::executor::ListingExecutor;
use super::lane::{SchedulerState, Shared};
use super::operation::{Operation, OperationKind, OperationPayload, PostJob, RenewJob};
use super::outcome::OutcomeSink;
use super::processor::{join_with_timeout, Processor};
use super::status::{AccountActivity, EnqueueAck, ProcessorState, StatusSnapshot};

/// Dual sequential lane scheduler.
///
/// At most one post and at most one renew operation run at any time;
/// everything else waits in two unbounded FIFO queues shared by all
/// accounts. Each lane's processor is started lazily on enqueue and goes
/// dormant once its queue drains.
///
/// Construct one per process and share it by reference (or `Arc`) with
/// request handlers. Call [`ListingScheduler::shutdown`] on process exit.
///
/// ```rust,ignore
/// let scheduler = ListingScheduler::new(SchedulerConfig::from_env()?, BrowserExecutor::new())?;
/// let ack = scheduler.enqueue_renew("seller@example.com", None)?;
/// println!("{} renews waiting", ack.status.renew_queue_size);
/// ```
pub struct ListingScheduler<E: ListingExecutor> {
    config: Arc<SchedulerConfig>,
    shared: Arc<Shared>,
    executor: Arc<E>,
    sink: Option<Arc<dyn OutcomeSink>>,
}

impl<E: ListingExecutor> ListingScheduler<E> {
    /// Create a scheduler. No threads are started until the first enqueue.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: SchedulerConfig, executor: E) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        info!(
            inter_operation_delay_ms = config.inter_operation_delay_ms,
            default_renewal_count = config.default_renewal_count,
            headless = config.automation.headless,
            "listing scheduler initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            shared: Arc::new(Shared::new()),
            executor: Arc::new(executor),
            sink: None,
        })
    }

    /// Attach a sink that receives a record for every executed operation.
    #[must_use]
    pub fn with_outcome_sink(mut self, sink: impl OutcomeSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Queue a listing to be posted for `account`.
    ///
    /// # Errors
    ///
    /// See [`ListingScheduler::enqueue`]. On `SchedulerError::WorkerSpawn`
    /// the listing is already queued; do not submit it again.
    pub fn enqueue_post(
        &self,
        account: impl Into<String>,
        job: PostJob,
    ) -> Result<EnqueueAck, SchedulerError> {
        self.enqueue(account, OperationPayload::Post(job))
    }

    /// Queue a renewal session for `account`. `None` uses the configured
    /// default target.
    ///
    /// # Errors
    ///
    /// See [`ListingScheduler::enqueue`]. On `SchedulerError::WorkerSpawn`
    /// the listing is already queued; do not submit it again.
    pub fn enqueue_renew(
        &self,
        account: impl Into<String>,
        target_count: Option<u32>,
    ) -> Result<EnqueueAck, SchedulerError> {
        let target_count = target_count.unwrap_or(self.config.default_renewal_count);
        self.enqueue(account, OperationPayload::Renew(RenewJob { target_count }))
    }

    /// Append an operation to its lane and make sure the lane has a
    /// processor. Never waits for execution.
    ///
    /// There is no size cap and no duplicate suppression: an account may
    /// have any number of pending operations, which run in submission order.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::ShutDown` once `shutdown` has been called
    /// - `SchedulerError::WorkerSpawn` if the processor thread could not be
    ///   created. The operation is already appended and counted, so callers
    ///   must not retry it; the next enqueue of the same kind retries the
    ///   spawn.
    pub fn enqueue(
        &self,
        account: impl Into<String>,
        payload: OperationPayload,
    ) -> Result<EnqueueAck, SchedulerError> {
        let operation = Operation::new(account, payload);
        let kind = operation.kind();
        let operation_id = operation.id();
        let message = format!(
            "{kind} operation added to queue for {}",
            operation.account()
        );

        let mut state = self.shared.state.lock();
        if state.is_shut_down() {
            return Err(SchedulerError::ShutDown);
        }

        state.note_queued(operation.account(), kind, now_ms());
        debug!(
            kind = %kind,
            account = %operation.account(),
            operation_id = %operation_id,
            "operation queued"
        );
        state.lane_mut(kind).push(operation);

        // Check-and-set under the same lock as the append, so two callers
        // can never both see Dormant and spawn two workers.
        if state.lane(kind).is_dormant() {
            self.start_processor(&mut state, kind, operation_id)?;
        }

        Ok(EnqueueAck {
            operation_id,
            kind,
            message,
            status: state.snapshot(),
        })
    }

    fn start_processor(
        &self,
        state: &mut SchedulerState,
        kind: OperationKind,
        operation_id: Uuid,
    ) -> Result<(), SchedulerError> {
        let processor = Processor {
            kind,
            shared: Arc::clone(&self.shared),
            executor: Arc::clone(&self.executor),
            config: Arc::clone(&self.config),
            sink: self.sink.clone(),
        };
        let worker = processor.spawn().map_err(|e| {
            warn!(
                kind = %kind,
                operation_id = %operation_id,
                error = %e,
                "failed to spawn processor, operation left queued"
            );
            SchedulerError::WorkerSpawn {
                operation_id,
                reason: e.to_string(),
            }
        })?;

        let lane = state.lane_mut(kind);
        lane.attach(worker);
        info!(
            kind = %kind,
            queued = lane.len(),
            spawn = lane.spawns(),
            "processor started"
        );
        Ok(())
    }

    /// System-wide status snapshot. The account is only logged: status is
    /// not tracked per account here (see [`ListingScheduler::account_activity`]).
    #[must_use]
    pub fn get_status(&self, account: &str) -> StatusSnapshot {
        debug!(account = %account, "status requested");
        self.shared.state.lock().snapshot()
    }

    /// System-wide status snapshot; same content as [`ListingScheduler::get_status`].
    #[must_use]
    pub fn get_all_status(&self) -> StatusSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Counters for one account, or `None` if it never enqueued anything.
    #[must_use]
    pub fn account_activity(&self, account: &str) -> Option<AccountActivity> {
        self.shared.state.lock().account(account).cloned()
    }

    /// Lifecycle state of the processor bound to `kind`.
    #[must_use]
    pub fn processor_state(&self, kind: OperationKind) -> ProcessorState {
        self.shared.state.lock().lane(kind).processor()
    }

    /// Whether `shutdown` has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().is_shut_down()
    }

    /// Stop both processors after their in-flight operations and release
    /// their threads.
    ///
    /// An operation already inside the executor is never interrupted.
    /// Queued operations that have not started are abandoned, not run.
    /// Each worker is joined for at most `shutdown_timeout_ms`, then
    /// detached. Idempotent.
    pub fn shutdown(&self) {
        let (workers, abandoned) = {
            let mut state = self.shared.state.lock();
            if !state.begin_shutdown() {
                return;
            }
            let workers: Vec<_> = OperationKind::ALL
                .into_iter()
                .filter_map(|kind| state.lane_mut(kind).terminate().map(|w| (kind, w)))
                .collect();
            (workers, state.snapshot().total_queue_size)
        };
        self.shared.wake.notify_all();

        info!(
            running = workers.len(),
            abandoned, "shutting down listing scheduler"
        );

        let timeout = self.config.shutdown_timeout();
        for (kind, worker) in workers {
            join_with_timeout(kind, worker, timeout);
        }

        info!("listing scheduler shut down complete");
    }
}

impl<E: ListingExecutor> Drop for ListingScheduler<E> {
    fn drop(&mut self) {
        // Signal only; joining here could block on a long executor call.
        let signalled = self.shared.state.lock().begin_shutdown();
        if signalled {
            self.shared.wake.notify_all();
            debug!("scheduler dropped without explicit shutdown, detaching processors");
        }
    }
}
