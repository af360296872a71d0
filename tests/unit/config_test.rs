//! Tests for configuration validation

use std::path::PathBuf;
use std::time::Duration;

use listing_lanes::config::{AutomationSettings, SchedulerConfig};

#[test]
fn test_default_config_values() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.inter_operation_delay_ms, 1_000);
    assert_eq!(cfg.default_renewal_count, 20);
    assert_eq!(cfg.shutdown_timeout(), Duration::from_secs(2));
    assert!(cfg.automation.headless);
    assert_eq!(cfg.automation.action_delay_ms, 150);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_invalid_renewal_count() {
    let cfg = SchedulerConfig::new().with_default_renewal_count(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_invalid_shutdown_timeout() {
    let cfg = SchedulerConfig::new().with_shutdown_timeout_ms(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_invalid_stack_size() {
    let cfg = SchedulerConfig::new().with_thread_stack_size(1024);
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("thread_stack_size"));
}

#[test]
fn test_zero_delay_is_valid() {
    let cfg = SchedulerConfig::new().with_inter_operation_delay_ms(0);
    assert!(cfg.validate().is_ok());
    assert!(cfg.inter_operation_delay().is_zero());
}

#[test]
fn test_config_from_json_fills_defaults() {
    let json = r#"{
        "inter_operation_delay_ms": 500,
        "automation": { "headless": false }
    }"#;

    let cfg = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.inter_operation_delay_ms, 500);
    assert_eq!(cfg.default_renewal_count, 20);
    assert!(!cfg.automation.headless);
    assert_eq!(cfg.automation.session_dir, PathBuf::from("sessions"));
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str("{ not json").is_err());
    assert!(SchedulerConfig::from_json_str(r#"{"default_renewal_count": 0}"#).is_err());
}

#[test]
fn test_config_roundtrips_through_json() {
    let cfg = SchedulerConfig::new()
        .with_default_renewal_count(12)
        .with_automation(AutomationSettings {
            headless: false,
            action_delay_ms: 300,
            session_dir: PathBuf::from("/srv/sessions"),
        });
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn test_session_file_per_account() {
    let settings = AutomationSettings {
        session_dir: PathBuf::from("/srv/sessions"),
        ..AutomationSettings::default()
    };
    assert_eq!(
        settings.session_file("bob@shop.co.uk"),
        PathBuf::from("/srv/sessions/bob_shop_co_uk.json")
    );
    assert_eq!(
        settings.session_file("plainname"),
        PathBuf::from("/srv/sessions/plainname.json")
    );
}
