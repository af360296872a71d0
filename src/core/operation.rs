//! Queued units of work and their payloads.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::clock::now_ms;

/// The two independent processing lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Publish a new listing.
    Post,
    /// Renew existing listings.
    Renew,
}

impl OperationKind {
    /// Both kinds, in lane order.
    pub const ALL: [Self; 2] = [Self::Post, Self::Renew];

    /// Lower-case name used in logs and thread names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Renew => "renew",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing data for a post operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostJob {
    /// Listing title.
    pub title: String,
    /// Listing body text.
    pub description: String,
    /// Price exactly as the seller entered it.
    pub price: String,
    /// Product image uploaded with the listing.
    pub image_path: PathBuf,
}

/// Parameters for a renew operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewJob {
    /// Upper bound on listings to renew in this session.
    pub target_count: u32,
}

/// Kind-specific payload of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationPayload {
    /// Post payload.
    Post(PostJob),
    /// Renew payload.
    Renew(RenewJob),
}

impl OperationPayload {
    /// Lane this payload is routed to.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Post(_) => OperationKind::Post,
            Self::Renew(_) => OperationKind::Renew,
        }
    }
}

/// One queued unit of work bound to an account.
///
/// Immutable once built. The queue owns it until its processor pops it,
/// and it is discarded after execution.
#[derive(Debug, Clone)]
pub struct Operation {
    id: Uuid,
    account: String,
    payload: OperationPayload,
    enqueued_at_ms: u128,
}

impl Operation {
    /// Build an operation stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(account: impl Into<String>, payload: OperationPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            account: account.into(),
            payload,
            enqueued_at_ms: now_ms(),
        }
    }

    /// Unique operation id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Account whose stored session the executor uses.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Kind-specific payload.
    #[must_use]
    pub const fn payload(&self) -> &OperationPayload {
        &self.payload
    }

    /// Lane this operation belongs to.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.payload.kind()
    }

    /// Enqueue time in milliseconds since the epoch. Observability only.
    #[must_use]
    pub const fn enqueued_at_ms(&self) -> u128 {
        self.enqueued_at_ms
    }

    /// Describe this operation as started at `started_at_ms`.
    #[must_use]
    pub fn describe(&self, started_at_ms: u128) -> OperationDescriptor {
        OperationDescriptor {
            id: self.id,
            kind: self.kind(),
            account: self.account.clone(),
            enqueued_at_ms: self.enqueued_at_ms,
            started_at_ms,
        }
    }
}

/// Status-facing description of the operation a processor is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Operation id.
    pub id: Uuid,
    /// Lane.
    pub kind: OperationKind,
    /// Account the operation acts for.
    pub account: String,
    /// Enqueue time (ms since epoch).
    pub enqueued_at_ms: u128,
    /// Time the processor handed it to the executor (ms since epoch).
    pub started_at_ms: u128,
}
