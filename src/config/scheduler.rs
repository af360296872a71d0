//! Scheduler and automation configuration structures.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Prefix shared by every environment variable read by [`SchedulerConfig::from_env`].
pub const ENV_PREFIX: &str = "LISTING_LANES_";

const MIN_THREAD_STACK_SIZE: usize = 64 * 1024;

/// Knobs forwarded to the browser executors on every call.
///
/// The scheduler never interprets these; they travel with each operation so
/// the executors stay tunable from one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Pause between consecutive clicks inside one browser session.
    pub action_delay_ms: u64,
    /// Directory holding the per-account stored session files.
    pub session_dir: PathBuf,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            headless: true,
            action_delay_ms: 150,
            session_dir: PathBuf::from("sessions"),
        }
    }
}

impl AutomationSettings {
    /// Per-click delay as a [`Duration`].
    #[must_use]
    pub const fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    /// Location of the stored browser session for `account`.
    ///
    /// `@` and `.` are replaced by `_`, so `jane.doe@mail.com` maps to
    /// `<session_dir>/jane_doe_mail_com.json`.
    #[must_use]
    pub fn session_file(&self, account: &str) -> PathBuf {
        let stem: String = account
            .chars()
            .map(|c| if c == '@' || c == '.' { '_' } else { c })
            .collect();
        self.session_dir.join(format!("{stem}.json"))
    }
}

/// Root scheduler configuration.
///
/// ```
/// use listing_lanes::config::SchedulerConfig;
///
/// let cfg = SchedulerConfig::new()
///     .with_inter_operation_delay_ms(250)
///     .with_default_renewal_count(10);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause a processor takes between two operations of its lane.
    pub inter_operation_delay_ms: u64,
    /// Renewal target used when a renew request does not name one.
    pub default_renewal_count: u32,
    /// How long `shutdown` waits for each processor thread before detaching it.
    pub shutdown_timeout_ms: u64,
    /// Stack size of each processor OS thread.
    pub thread_stack_size: usize,
    /// Settings handed to the executors.
    pub automation: AutomationSettings,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            inter_operation_delay_ms: 1_000,
            default_renewal_count: 20,
            shutdown_timeout_ms: 2_000,
            thread_stack_size: 2 * 1024 * 1024,
            automation: AutomationSettings::default(),
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause between operations of one lane.
    #[must_use]
    pub const fn with_inter_operation_delay_ms(mut self, delay_ms: u64) -> Self {
        self.inter_operation_delay_ms = delay_ms;
        self
    }

    /// Set the renewal target used when a request omits it.
    #[must_use]
    pub const fn with_default_renewal_count(mut self, count: u32) -> Self {
        self.default_renewal_count = count;
        self
    }

    /// Set the per-thread join timeout used by `shutdown`.
    #[must_use]
    pub const fn with_shutdown_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.shutdown_timeout_ms = timeout_ms;
        self
    }

    /// Set the processor thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Replace the executor settings.
    #[must_use]
    pub fn with_automation(mut self, automation: AutomationSettings) -> Self {
        self.automation = automation;
        self
    }

    /// Inter-operation delay as a [`Duration`].
    #[must_use]
    pub const fn inter_operation_delay(&self) -> Duration {
        Duration::from_millis(self.inter_operation_delay_ms)
    }

    /// Shutdown join timeout as a [`Duration`].
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_renewal_count == 0 {
            return Err("default_renewal_count must be greater than 0".into());
        }
        if self.shutdown_timeout_ms == 0 {
            return Err("shutdown_timeout_ms must be greater than 0".into());
        }
        if self.thread_stack_size < MIN_THREAD_STACK_SIZE {
            return Err(format!(
                "thread_stack_size must be at least {MIN_THREAD_STACK_SIZE} bytes"
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their default values.
    ///
    /// # Errors
    ///
    /// Returns a message if the JSON is malformed or a value is invalid.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading a `.env`
    /// file first when one exists.
    ///
    /// Recognised variables (all optional, prefixed with [`ENV_PREFIX`]):
    /// `INTER_OPERATION_DELAY_MS`, `DEFAULT_RENEWAL_COUNT`,
    /// `SHUTDOWN_TIMEOUT_MS`, `THREAD_STACK_SIZE`, `HEADLESS`,
    /// `ACTION_DELAY_MS`, `SESSION_DIR`.
    ///
    /// # Errors
    ///
    /// Fails if a variable cannot be parsed or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, applying the
    /// same variable names as [`SchedulerConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Fails if a value cannot be parsed or the result does not validate.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        override_from(&lookup, "INTER_OPERATION_DELAY_MS", &mut cfg.inter_operation_delay_ms)?;
        override_from(&lookup, "DEFAULT_RENEWAL_COUNT", &mut cfg.default_renewal_count)?;
        override_from(&lookup, "SHUTDOWN_TIMEOUT_MS", &mut cfg.shutdown_timeout_ms)?;
        override_from(&lookup, "THREAD_STACK_SIZE", &mut cfg.thread_stack_size)?;
        override_from(&lookup, "HEADLESS", &mut cfg.automation.headless)?;
        override_from(&lookup, "ACTION_DELAY_MS", &mut cfg.automation.action_delay_ms)?;
        override_from(&lookup, "SESSION_DIR", &mut cfg.automation.session_dir)?;

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Directory the executors read session files from.
    #[must_use]
    pub fn session_dir(&self) -> &Path {
        &self.automation.session_dir
    }
}

fn override_from<F, T>(lookup: &F, name: &str, slot: &mut T) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let key = format!("{ENV_PREFIX}{name}");
    if let Some(raw) = lookup(&key) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
    }
    Ok(())
}
