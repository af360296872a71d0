//! API-facing request/response models for web handlers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{
    EnqueueAck, ListingExecutor, ListingScheduler, PostJob, SchedulerError, StatusSnapshot,
};

/// Status string carried by every successful enqueue response.
pub const QUEUED: &str = "queued";

/// Post submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    /// Marketplace account (login email).
    pub account: String,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Price as entered.
    pub price: String,
    /// Product image.
    pub image_path: PathBuf,
}

/// Renew submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewRequest {
    /// Marketplace account (login email).
    pub account: String,
    /// Listings to renew; the configured default when absent.
    #[serde(default)]
    pub target_count: Option<u32>,
}

/// Response for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedResponse {
    /// Always [`QUEUED`].
    pub status: String,
    /// Human-readable confirmation.
    pub message: String,
    /// Id of the queued operation.
    pub operation_id: Uuid,
    /// Scheduler status right after the append.
    pub status_snapshot: StatusSnapshot,
}

impl From<EnqueueAck> for QueuedResponse {
    fn from(ack: EnqueueAck) -> Self {
        Self {
            status: QUEUED.to_string(),
            message: ack.message,
            operation_id: ack.operation_id,
            status_snapshot: ack.status,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Accepting new operations.
    pub ok: bool,
    /// Post lane busy.
    pub post_active: bool,
    /// Renew lane busy.
    pub renew_active: bool,
}

/// Queue a post.
///
/// # Errors
///
/// Propagates [`SchedulerError`] from the scheduler.
pub fn submit_post<E: ListingExecutor>(
    scheduler: &ListingScheduler<E>,
    req: PostRequest,
) -> Result<QueuedResponse, SchedulerError> {
    let job = PostJob {
        title: req.title,
        description: req.description,
        price: req.price,
        image_path: req.image_path,
    };
    scheduler.enqueue_post(req.account, job).map(Into::into)
}

/// Queue a renewal.
///
/// # Errors
///
/// Propagates [`SchedulerError`] from the scheduler.
pub fn submit_renew<E: ListingExecutor>(
    scheduler: &ListingScheduler<E>,
    req: RenewRequest,
) -> Result<QueuedResponse, SchedulerError> {
    scheduler
        .enqueue_renew(req.account, req.target_count)
        .map(Into::into)
}

/// Status for a caller; system-wide whether or not an account is given.
pub fn status<E: ListingExecutor>(
    scheduler: &ListingScheduler<E>,
    account: Option<&str>,
) -> StatusSnapshot {
    account.map_or_else(|| scheduler.get_all_status(), |a| scheduler.get_status(a))
}

/// Return a health payload.
pub fn health<E: ListingExecutor>(scheduler: &ListingScheduler<E>) -> Health {
    let snapshot = scheduler.get_all_status();
    Health {
        ok: !scheduler.is_shut_down(),
        post_active: snapshot.post_active,
        renew_active: snapshot.renew_active,
    }
}
