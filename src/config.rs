//! System configuration parameters
//!
//! All tunable parameters for the hazard monitor.  Credentials default to
//! values baked in at build time (`HAZARDMON_*` environment variables) and
//! can be overridden from JSON on hosts that have a filesystem.

use serde::{Deserialize, Serialize};

/// Default telemetry endpoint.
const DEFAULT_HOST: &str = "api.thingspeak.com";

/// What to do when the start-up connectivity gate fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectFailurePolicy {
    /// Blink the alarm pattern forever; local monitoring never starts.
    #[default]
    Halt,
    /// Run the local sampling/actuation loop without telemetry.
    LocalOnly,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Network ---
    pub wifi_ssid: heapless::String<SSID_CAPACITY>,
    pub wifi_password: heapless::String<PASSWORD_CAPACITY>,
    /// Association polls before giving up (one per `connect_poll_interval_ms`).
    pub connect_attempts: u32,
    pub connect_poll_interval_ms: u32,
    pub connect_failure: ConnectFailurePolicy,

    // --- Telemetry ---
    pub telemetry_host: heapless::String<HOST_CAPACITY>,
    pub telemetry_port: u16,
    pub api_key: heapless::String<API_KEY_CAPACITY>,
    /// Periodic upload interval (milliseconds).
    pub upload_interval_ms: u32,
    /// Socket connect/read/write timeout (milliseconds).
    pub upload_timeout_ms: u32,

    // --- Hazard thresholds ---
    /// Gas level (% of full scale) above which the hazard trips.
    pub gas_threshold_percent: f32,
    /// Temperature (Celsius) above which the hazard trips.
    pub temperature_threshold_c: f32,

    // --- Timing ---
    /// Idle delay at the end of every healthy cycle.
    pub idle_delay_ms: u32,
    /// Pause after every upload attempt.
    pub settle_delay_ms: u32,
    /// Pause after a faulted cycle.
    pub fault_backoff_ms: u32,
    /// Sensor warm-up before the connectivity gate.
    pub warmup_ms: u32,
    /// Half-period of the connectivity failure alarm blink.
    pub failure_blink_ms: u32,
    /// Task watchdog timeout.
    pub watchdog_timeout_ms: u32,
}

const SSID_CAPACITY: usize = 32;
const PASSWORD_CAPACITY: usize = 64;
const HOST_CAPACITY: usize = 64;
const API_KEY_CAPACITY: usize = 32;

const fn fits(value: Option<&str>, capacity: usize) -> bool {
    match value {
        Some(s) => s.len() <= capacity,
        None => true,
    }
}

// Baked-in credentials must fit their fields; fail the build otherwise.
const _: () = assert!(
    fits(option_env!("HAZARDMON_WIFI_SSID"), SSID_CAPACITY),
    "HAZARDMON_WIFI_SSID is longer than 32 bytes"
);
const _: () = assert!(
    fits(option_env!("HAZARDMON_WIFI_PASSWORD"), PASSWORD_CAPACITY),
    "HAZARDMON_WIFI_PASSWORD is longer than 64 bytes"
);
const _: () = assert!(
    fits(option_env!("HAZARDMON_HOST"), HOST_CAPACITY),
    "HAZARDMON_HOST is longer than 64 bytes"
);
const _: () = assert!(
    fits(option_env!("HAZARDMON_API_KEY"), API_KEY_CAPACITY),
    "HAZARDMON_API_KEY is longer than 32 bytes"
);

/// Copy `s` into a bounded string.  A value that does not fit is rejected
/// with `too_long`, never cut short.
fn bounded<const N: usize>(s: &str, too_long: &'static str) -> Result<heapless::String<N>, ConfigError> {
    heapless::String::try_from(s).map_err(|_| ConfigError::ValidationFailed(too_long))
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Network
            wifi_ssid: bounded(
                option_env!("HAZARDMON_WIFI_SSID").unwrap_or("hazardmon"),
                "wifi_ssid too long",
            )
            .unwrap_or_default(),
            wifi_password: bounded(
                option_env!("HAZARDMON_WIFI_PASSWORD").unwrap_or("change-me-please"),
                "wifi_password too long",
            )
            .unwrap_or_default(),
            connect_attempts: 20,
            connect_poll_interval_ms: 1000,
            connect_failure: ConnectFailurePolicy::Halt,

            // Telemetry
            telemetry_host: bounded(
                option_env!("HAZARDMON_HOST").unwrap_or(DEFAULT_HOST),
                "telemetry_host too long",
            )
            .unwrap_or_default(),
            telemetry_port: 80,
            api_key: bounded(
                option_env!("HAZARDMON_API_KEY").unwrap_or("CHANGE_ME_API_KEY"),
                "api_key too long",
            )
            .unwrap_or_default(),
            upload_interval_ms: 16_000,
            upload_timeout_ms: 6_000,

            // Thresholds
            gas_threshold_percent: 60.0,
            temperature_threshold_c: 50.0,

            // Timing
            idle_delay_ms: 200,
            settle_delay_ms: 1_000,
            fault_backoff_ms: 1_000,
            warmup_ms: 2_000,
            failure_blink_ms: 100,
            watchdog_timeout_ms: 30_000,
        }
    }
}

/// Errors from loading or validating a [`MonitorConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Parse,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse => write!(f, "config parse error"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Parse => Self::Config("parse error"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

impl MonitorConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the monitor unsafe or inert.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("wifi_ssid is empty"));
        }
        if self.telemetry_host.is_empty() {
            return Err(ConfigError::ValidationFailed("telemetry_host is empty"));
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::ValidationFailed("api_key is empty"));
        }
        if self.telemetry_port == 0 {
            return Err(ConfigError::ValidationFailed("telemetry_port is zero"));
        }
        if !(0.0..100.0).contains(&self.gas_threshold_percent) {
            return Err(ConfigError::ValidationFailed(
                "gas_threshold_percent must be in [0, 100)",
            ));
        }
        if !self.temperature_threshold_c.is_finite() {
            return Err(ConfigError::ValidationFailed("temperature_threshold_c is not finite"));
        }
        if self.connect_attempts == 0 {
            return Err(ConfigError::ValidationFailed("connect_attempts is zero"));
        }
        if self.upload_interval_ms == 0 || self.upload_interval_ms > i32::MAX as u32 {
            return Err(ConfigError::ValidationFailed("upload_interval_ms out of range"));
        }
        if self.upload_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("upload_timeout_ms is zero"));
        }
        if self.idle_delay_ms == 0 || self.idle_delay_ms >= self.upload_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "idle_delay_ms must be non-zero and below upload_interval_ms",
            ));
        }
        if self.failure_blink_ms == 0 {
            return Err(ConfigError::ValidationFailed("failure_blink_ms is zero"));
        }
        // Worst-case cycle: one upload blocked on every socket call, then settle.
        let worst_cycle_ms = self
            .upload_timeout_ms
            .saturating_mul(3)
            .saturating_add(self.settle_delay_ms);
        if self.watchdog_timeout_ms <= worst_cycle_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed the worst-case upload cycle",
            ));
        }
        Ok(())
    }
}
