//! # Listing Lanes
//!
//! Sequential post/renew lanes for marketplace listing automation.
//!
//! Posting and renewing classified listings is done by browser automation
//! against a third-party marketplace. Those sessions are slow, stateful per
//! login, and rate-sensitive, so this crate serializes them: at most one
//! **post** and at most one **renew** operation run at any time,
//! system-wide, while any number of operations from any number of accounts
//! wait behind them.
//!
//! ## Model
//!
//! - **Lanes**: two unbounded FIFO queues (post, renew) shared by all
//!   accounts. Submission order is execution order within a lane.
//! - **Processors**: one dedicated OS thread per lane, started lazily on
//!   enqueue and retired once the lane drains. A processor blocks on the
//!   executor for the full duration of each operation; the two lanes run
//!   independently of each other.
//! - **Executors**: the browser routines, supplied by the application
//!   through the [`core::ListingExecutor`] trait. Failures and crashes are
//!   counted and logged; they never stall a lane and are never retried.
//! - **Status**: a system-wide [`core::StatusSnapshot`] copied out under
//!   the scheduler lock.
//!
//! ```rust,ignore
//! use listing_lanes::config::SchedulerConfig;
//! use listing_lanes::core::{ListingScheduler, PostJob};
//!
//! let scheduler = ListingScheduler::new(SchedulerConfig::from_env()?, MyBrowserExecutor)?;
//!
//! let ack = scheduler.enqueue_post("seller@example.com", PostJob {
//!     title: "Oak desk".into(),
//!     description: "Solid oak, 120cm".into(),
//!     price: "80".into(),
//!     image_path: "uploads/desk.jpg".into(),
//! })?;
//! scheduler.enqueue_renew("seller@example.com", Some(30))?;
//!
//! println!("{}", ack.message);
//! // ...
//! scheduler.shutdown();
//! ```
//!
//! See `tests/scheduler_test.rs` for end-to-end behaviour with stub executors.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Operations, lanes, processors and the scheduler facade.
pub mod core;
/// Scheduler and executor configuration.
pub mod config;
/// Request/response models for web handlers.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::config::SchedulerConfig;
pub use crate::core::{ListingExecutor, ListingScheduler, SchedulerError, StatusSnapshot};
