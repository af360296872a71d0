//! Tests for error types

use listing_lanes::core::{AppResult, ExecutorError, SchedulerError};
use uuid::Uuid;

#[test]
fn test_scheduler_error_display() {
    assert_eq!(SchedulerError::ShutDown.to_string(), "scheduler is shut down");

    let operation_id = Uuid::nil();
    let err = SchedulerError::WorkerSpawn {
        operation_id,
        reason: "resource temporarily unavailable".into(),
    };
    assert_eq!(
        err.to_string(),
        format!(
            "operation {operation_id} queued but processor failed to start: \
             resource temporarily unavailable"
        )
    );

    let err = SchedulerError::InvalidConfig("default_renewal_count must be greater than 0".into());
    assert!(err.to_string().starts_with("invalid configuration: "));
}

#[test]
fn test_executor_error_display() {
    assert_eq!(
        ExecutorError::SessionMissing("a@example.com".into()).to_string(),
        "no stored session for a@example.com"
    );
    assert_eq!(
        ExecutorError::SessionExpired("a@example.com".into()).to_string(),
        "session expired for a@example.com"
    );
    assert_eq!(
        ExecutorError::Browser("selector not found".into()).to_string(),
        "browser error: selector not found"
    );
    assert_eq!(ExecutorError::Timeout.to_string(), "executor timed out");
}

#[test]
fn test_app_result_wraps_scheduler_error() {
    fn enqueue_late() -> AppResult<()> {
        let rejected: Result<(), SchedulerError> = Err(SchedulerError::ShutDown);
        rejected?;
        Ok(())
    }

    let err = enqueue_late().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedulerError>(),
        Some(SchedulerError::ShutDown)
    ));
}
