//! Shared stub executor and polling helpers for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use listing_lanes::config::{AutomationSettings, SchedulerConfig};
use listing_lanes::core::{
    ExecutorError, ListingExecutor, ListingScheduler, OperationKind, PostJob, PostOutcome,
    RenewJob, RenewOutcome, RenewStopReason, StatusSnapshot,
};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// STUB EXECUTOR
// ============================================================================

/// What the stub does for a given account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Return a successful outcome.
    Succeed,
    /// Return normally with `success: false`.
    ReportFailure,
    /// Return an `ExecutorError`.
    Error,
    /// Panic inside the executor.
    Panic,
}

/// One executor invocation as seen by the stub.
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: OperationKind,
    pub account: String,
    pub renew_target: Option<u32>,
    pub headless: bool,
    pub started: Instant,
    pub finished: Instant,
}

/// Executor that sleeps, records `(kind, account)` in call order, and
/// tracks how many calls of each kind overlap.
#[derive(Clone)]
pub struct StubExecutor {
    delay: Duration,
    jitter_ms: u64,
    calls: Arc<Mutex<Vec<Call>>>,
    behaviors: Arc<Mutex<HashMap<String, Behavior>>>,
    post_in_flight: Arc<AtomicUsize>,
    renew_in_flight: Arc<AtomicUsize>,
    max_post_in_flight: Arc<AtomicUsize>,
    max_renew_in_flight: Arc<AtomicUsize>,
}

impl StubExecutor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter_ms: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
            behaviors: Arc::new(Mutex::new(HashMap::new())),
            post_in_flight: Arc::new(AtomicUsize::new(0)),
            renew_in_flight: Arc::new(AtomicUsize::new(0)),
            max_post_in_flight: Arc::new(AtomicUsize::new(0)),
            max_renew_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a random 0..=`jitter_ms` on top of the base delay.
    pub fn with_jitter_ms(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    pub fn with_behavior(self, account: &str, behavior: Behavior) -> Self {
        self.behaviors.lock().insert(account.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, kind: OperationKind) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.kind == kind).collect()
    }

    pub fn accounts_for(&self, kind: OperationKind) -> Vec<String> {
        self.calls_for(kind).into_iter().map(|c| c.account).collect()
    }

    pub fn max_in_flight(&self, kind: OperationKind) -> usize {
        match kind {
            OperationKind::Post => self.max_post_in_flight.load(Ordering::SeqCst),
            OperationKind::Renew => self.max_renew_in_flight.load(Ordering::SeqCst),
        }
    }

    async fn run(
        &self,
        kind: OperationKind,
        account: &str,
        renew_target: Option<u32>,
        settings: &AutomationSettings,
    ) -> Result<String, ExecutorError> {
        let (in_flight, max_in_flight) = match kind {
            OperationKind::Post => (&self.post_in_flight, &self.max_post_in_flight),
            OperationKind::Renew => (&self.renew_in_flight, &self.max_renew_in_flight),
        };
        let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(current, Ordering::SeqCst);

        let started = Instant::now();
        let jitter = if self.jitter_ms > 0 {
            rand::rng().random_range(0..=self.jitter_ms)
        } else {
            0
        };
        tokio::time::sleep(self.delay + Duration::from_millis(jitter)).await;

        in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().push(Call {
            kind,
            account: account.to_string(),
            renew_target,
            headless: settings.headless,
            started,
            finished: Instant::now(),
        });

        let behavior = self
            .behaviors
            .lock()
            .get(account)
            .copied()
            .unwrap_or(Behavior::Succeed);
        match behavior {
            Behavior::Succeed | Behavior::ReportFailure => Ok(format!("{kind} done for {account}")),
            Behavior::Error => Err(ExecutorError::Browser(format!(
                "page crashed for {account}"
            ))),
            Behavior::Panic => panic!("stub executor panic for {account}"),
        }
    }

    fn reports_failure(&self, account: &str) -> bool {
        self.behaviors.lock().get(account) == Some(&Behavior::ReportFailure)
    }
}

#[async_trait]
impl ListingExecutor for StubExecutor {
    async fn post(
        &self,
        account: &str,
        _job: &PostJob,
        settings: &AutomationSettings,
    ) -> Result<PostOutcome, ExecutorError> {
        let message = self.run(OperationKind::Post, account, None, settings).await?;
        if self.reports_failure(account) {
            return Ok(PostOutcome {
                success: false,
                message: "Publish button not found".into(),
            });
        }
        Ok(PostOutcome {
            success: true,
            message,
        })
    }

    async fn renew(
        &self,
        account: &str,
        job: &RenewJob,
        settings: &AutomationSettings,
    ) -> Result<RenewOutcome, ExecutorError> {
        let message = self
            .run(OperationKind::Renew, account, Some(job.target_count), settings)
            .await?;
        if self.reports_failure(account) {
            return Ok(RenewOutcome {
                success: false,
                renewed_count: 0,
                available_count: 0,
                message: "Session expired. Please re-import session.".into(),
                stop_reason: None,
            });
        }
        Ok(RenewOutcome {
            success: true,
            renewed_count: job.target_count,
            available_count: job.target_count,
            message,
            stop_reason: Some(RenewStopReason::TargetReached),
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Config with no throttle so tests run fast.
pub fn fast_config() -> SchedulerConfig {
    SchedulerConfig::new().with_inter_operation_delay_ms(0)
}

pub fn post_job(title: &str) -> PostJob {
    PostJob {
        title: title.to_string(),
        description: format!("{title} in good condition"),
        price: "25".to_string(),
        image_path: format!("uploads/{title}.jpg").into(),
    }
}

/// Poll `condition` every 5ms until it holds or `timeout` expires.
pub fn wait_until<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Wait for both lanes to drain and go dormant, then return the status.
pub fn wait_idle<E: ListingExecutor>(
    scheduler: &ListingScheduler<E>,
    timeout: Duration,
) -> StatusSnapshot {
    assert!(
        wait_until(timeout, || scheduler.get_all_status().is_idle()),
        "scheduler did not go idle within {timeout:?}: {:?}",
        scheduler.get_all_status()
    );
    scheduler.get_all_status()
}
