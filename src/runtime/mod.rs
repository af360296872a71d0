//! Runtime-facing API surface for request handlers.

pub mod api;

pub use api::{
    health, status, submit_post, submit_renew, Health, PostRequest, QueuedResponse, RenewRequest,
};
