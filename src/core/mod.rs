//! Core scheduling: operations, lanes, processors and the facade.

pub mod error;
pub mod executor;
pub(crate) mod lane;
pub mod operation;
pub mod outcome;
pub(crate) mod processor;
pub mod scheduler;
pub mod status;

pub use error::{AppResult, SchedulerError};
pub use executor::{
    ExecutorError, ListingExecutor, OperationOutcome, PostOutcome, RenewOutcome, RenewStopReason,
};
pub use operation::{
    Operation, OperationDescriptor, OperationKind, OperationPayload, PostJob, RenewJob,
};
pub use outcome::{InMemoryOutcomeSink, OperationRecord, OperationResult, OutcomeSink};
pub use scheduler::ListingScheduler;
pub use status::{AccountActivity, EnqueueAck, ProcessorState, StatusSnapshot};
