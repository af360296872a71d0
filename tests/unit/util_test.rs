//! Tests for utility helpers

use listing_lanes::util::clock::now_ms;
use listing_lanes::util::telemetry::{init_tracing, DEFAULT_LOG_FILTER};

#[test]
fn test_now_ms_advances() {
    let before = now_ms();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(now_ms() > before);
}

#[test]
fn test_init_tracing_is_repeatable() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized twice without panicking");
}

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("listing_lanes="));
}
