//! Executor trait for the browser automation routines and the result model
//! they report back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AutomationSettings;

use super::operation::{Operation, OperationPayload, PostJob, RenewJob};

/// Faults raised by an executor. Any `Err` (or a panic) is treated by the
/// processor as a crash: logged, counted, dropped, never retried.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// No stored session exists for the account.
    #[error("no stored session for {0}")]
    SessionMissing(String),
    /// The stored session was rejected by the marketplace.
    #[error("session expired for {0}")]
    SessionExpired(String),
    /// The browser or page automation failed.
    #[error("browser error: {0}")]
    Browser(String),
    /// The executor gave up waiting on the remote site.
    #[error("executor timed out")]
    Timeout,
}

/// Result of a post session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOutcome {
    /// Whether the listing was published.
    pub success: bool,
    /// Human-readable detail.
    pub message: String,
}

/// Why a renew session stopped clicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewStopReason {
    /// The requested target count was reached.
    TargetReached,
    /// Fewer listings were eligible than requested and all of them were renewed.
    AllAvailableRenewed,
    /// The marketplace reported nothing eligible for renewal.
    NoneAvailable,
    /// The button list ran out without a confirming page state.
    ListExhausted,
}

/// Result of a renew session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewOutcome {
    /// Whether the session completed without a page-level error.
    pub success: bool,
    /// Listings actually renewed.
    pub renewed_count: u32,
    /// Listings that were eligible when the page loaded.
    pub available_count: u32,
    /// Human-readable detail.
    pub message: String,
    /// Exit condition, when the session got far enough to have one.
    pub stop_reason: Option<RenewStopReason>,
}

/// Kind-tagged executor result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// Result of a post operation.
    Posted(PostOutcome),
    /// Result of a renew operation.
    Renewed(RenewOutcome),
}

impl OperationOutcome {
    /// Whether the executor reported success.
    #[must_use]
    pub const fn success(&self) -> bool {
        match self {
            Self::Posted(outcome) => outcome.success,
            Self::Renewed(outcome) => outcome.success,
        }
    }

    /// Executor-supplied message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Posted(outcome) => &outcome.message,
            Self::Renewed(outcome) => &outcome.message,
        }
    }
}

/// The browser automation routines driven by the scheduler.
///
/// Each call performs a full login-and-act browser session for one account
/// and may take tens of seconds. Calls for the same lane are never issued
/// concurrently; a post and a renew call may overlap.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use listing_lanes::config::AutomationSettings;
/// use listing_lanes::core::{
///     ExecutorError, ListingExecutor, PostJob, PostOutcome, RenewJob, RenewOutcome,
/// };
///
/// struct Browser;
///
/// #[async_trait]
/// impl ListingExecutor for Browser {
///     async fn post(&self, account: &str, job: &PostJob, settings: &AutomationSettings)
///         -> Result<PostOutcome, ExecutorError>
///     {
///         let session = settings.session_file(account);
///         // launch browser with `session`, fill in `job`, publish...
///     }
///
///     async fn renew(&self, account: &str, job: &RenewJob, settings: &AutomationSettings)
///         -> Result<RenewOutcome, ExecutorError>
///     {
///         // open the renewal dialog and click up to `job.target_count` buttons...
///     }
/// }
/// ```
#[async_trait]
pub trait ListingExecutor: Send + Sync + 'static {
    /// Publish one listing for `account`.
    ///
    /// # Threading
    ///
    /// Called from the post processor's dedicated thread, inside its own
    /// single-threaded tokio runtime.
    async fn post(
        &self,
        account: &str,
        job: &PostJob,
        settings: &AutomationSettings,
    ) -> Result<PostOutcome, ExecutorError>;

    /// Renew up to `job.target_count` listings for `account`.
    async fn renew(
        &self,
        account: &str,
        job: &RenewJob,
        settings: &AutomationSettings,
    ) -> Result<RenewOutcome, ExecutorError>;
}

/// Route an operation to the matching executor call.
pub(crate) async fn dispatch<E>(
    executor: &E,
    operation: &Operation,
    settings: &AutomationSettings,
) -> Result<OperationOutcome, ExecutorError>
where
    E: ListingExecutor + ?Sized,
{
    match operation.payload() {
        OperationPayload::Post(job) => executor
            .post(operation.account(), job, settings)
            .await
            .map(OperationOutcome::Posted),
        OperationPayload::Renew(job) => executor
            .renew(operation.account(), job, settings)
            .await
            .map(OperationOutcome::Renewed),
    }
}
