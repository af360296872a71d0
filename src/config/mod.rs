//! Configuration models for the scheduler and the executors it drives.

pub mod scheduler;

pub use scheduler::{AutomationSettings, SchedulerConfig, ENV_PREFIX};
