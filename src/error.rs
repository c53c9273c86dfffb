//! Unified error types for the hazard monitor firmware.
//!
//! A single `Error` enum that every subsystem converts into, plus a
//! [`FaultPolicy`] table that tells the control loop and `main` what to do
//! with each kind.  All variants are `Copy` so they can be passed through
//! the event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorReadError),
    /// A telemetry upload failed.
    Upload(UploadError),
    /// The network link could not be established.
    Connectivity(ConnectivityFailure),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Upload(e) => write!(f, "upload: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Fault policy
// ---------------------------------------------------------------------------

/// What the firmware does when an error of a given kind surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Absorbed where it happens; the data it would have produced is
    /// marked invalid.
    Degrade,
    /// Logged, state still advances, loop continues at normal cadence.
    LogAndContinue,
    /// Logged, loop sleeps the fault backoff before the next cycle.
    Backoff,
    /// The run cannot continue.
    Fatal,
}

impl Error {
    /// Policy table for every error kind.
    ///
    /// | Kind            | Policy           |
    /// |-----------------|------------------|
    /// | `Sensor`        | `Backoff`        |
    /// | `Upload`        | `LogAndContinue` |
    /// | `Connectivity`  | `Fatal`          |
    /// | `Init`/`Config` | `Fatal`          |
    ///
    /// Temperature read failures never reach this table: the sampler
    /// degrades them in place (see [`SensorReadError::policy`]).
    pub const fn policy(&self) -> FaultPolicy {
        match self {
            Self::Sensor(_) => FaultPolicy::Backoff,
            Self::Upload(_) => FaultPolicy::LogAndContinue,
            Self::Connectivity(_) | Self::Init(_) | Self::Config(_) => FaultPolicy::Fatal,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorReadError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// Single-wire sensor did not answer the start signal.
    NoResponse,
    /// Single-wire sensor stopped toggling mid-frame.
    Timeout,
    /// Frame checksum did not match.
    ChecksumMismatch,
    /// Decoded value is outside what the part can measure.
    OutOfRange,
}

impl SensorReadError {
    /// Temperature driver failures are degraded by the sampler; anything
    /// else escalates to the loop boundary.
    pub const fn policy(&self) -> FaultPolicy {
        match self {
            Self::NoResponse | Self::Timeout | Self::ChecksumMismatch | Self::OutOfRange => {
                FaultPolicy::Degrade
            }
            Self::AdcReadFailed | Self::GpioReadFailed => FaultPolicy::Backoff,
        }
    }
}

impl fmt::Display for SensorReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::Timeout => write!(f, "sensor bus timeout"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "value out of sensor range"),
        }
    }
}

impl From<SensorReadError> for Error {
    fn from(e: SensorReadError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Upload errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// Host name could not be resolved.
    Resolve,
    /// TCP connection was refused or failed.
    Connect,
    /// Writing the request failed.
    Send,
    /// Reading the response failed.
    Receive,
    /// A socket operation exceeded the upload timeout.
    Timeout,
    /// The request did not fit the request buffer.
    Encode,
    /// No network link is available.
    Offline,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "host resolution failed"),
            Self::Connect => write!(f, "connect failed"),
            Self::Send => write!(f, "send failed"),
            Self::Receive => write!(f, "receive failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Encode => write!(f, "request too large"),
            Self::Offline => write!(f, "no network link"),
        }
    }
}

impl From<UploadError> for Error {
    fn from(e: UploadError) -> Self {
        Self::Upload(e)
    }
}

// ---------------------------------------------------------------------------
// Connectivity failure
// ---------------------------------------------------------------------------

/// The link was not up after the whole attempt budget was spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityFailure {
    pub attempts: u32,
}

impl fmt::Display for ConnectivityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link not up after {} attempts", self.attempts)
    }
}

impl From<ConnectivityFailure> for Error {
    fn from(e: ConnectivityFailure) -> Self {
        Self::Connectivity(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
