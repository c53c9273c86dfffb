//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ HazardMonitor (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, network, clock, event sinks)
//! implement these traits.  The [`HazardMonitor`](super::service::HazardMonitor)
//! and the connectivity/telemetry components consume them via generics, so
//! the domain core never touches hardware or sockets directly.
//!
//! All port errors are typed; callers handle every variant explicitly.

use core::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use embedded_hal::delay::DelayNs;

use crate::drivers::actuators::ActuatorCommand;
use crate::error::{Result, UploadError};
use crate::safety::HazardState;
use crate::sensors::SensorReading;
use crate::telemetry::{Ack, UploadRecord};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
pub trait SensorPort {
    /// Read every sensor and return a fresh reading.
    ///
    /// Temperature failures are already folded into the reading; an `Err`
    /// here means the gas or flame channel itself failed.
    fn sample(&mut self) -> Result<SensorReading>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the alarm outputs.
pub trait ActuatorPort {
    /// Drive all outputs to the canonical levels for `state`.  Never fails.
    fn apply(&mut self, state: HazardState) -> ActuatorCommand;
}

/// Status patterns shown while the network link is being established.
pub trait StatusIndicator {
    /// Invert the "busy / failed" indicator.
    fn toggle_status(&mut self);

    /// Steady "ready" pattern.
    fn show_ready(&mut self);

    /// Short audible acknowledgement.
    fn chirp(&mut self, delay: &mut impl DelayNs);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Millisecond monotonic tick source that can also block the caller.
///
/// `now_ms` wraps at `u32::MAX`; compare ticks only through
/// [`ticks_diff`](crate::scheduler::ticks_diff).
pub trait ClockPort: DelayNs {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Network link port (driven adapter: domain ↔ Wi-Fi station)
// ───────────────────────────────────────────────────────────────

/// Layer-2 association.
pub trait LinkPort {
    /// Start associating with `ssid`.  Returns immediately; poll
    /// [`is_connected`](Self::is_connected) for completion.
    fn begin(&mut self, ssid: &str, password: &str) -> core::result::Result<(), LinkError>;

    fn is_connected(&mut self) -> bool;

    /// Address assigned to the station, once connected.
    fn ip_addr(&self) -> Option<Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// Network stack port (driven adapter: domain ↔ DNS / TCP)
// ───────────────────────────────────────────────────────────────

/// Blocking name resolution and TCP connect.
pub trait NetStack {
    type Conn: Connection;

    /// Resolve `host` to its first address.
    fn resolve(&mut self, host: &str, port: u16) -> core::result::Result<SocketAddr, UploadError>;

    /// Open a TCP connection.  `timeout_ms` bounds the connect and every
    /// later send/receive on the returned connection.
    fn open(
        &mut self,
        addr: SocketAddr,
        timeout_ms: u32,
    ) -> core::result::Result<Self::Conn, UploadError>;
}

/// One open TCP connection.
pub trait Connection {
    fn send_all(&mut self, data: &[u8]) -> core::result::Result<(), UploadError>;

    /// Read at most `buf.len()` bytes.  `Ok(0)` means the peer closed.
    fn recv(&mut self, buf: &mut [u8]) -> core::result::Result<usize, UploadError>;

    /// Release the socket.  Infallible; called on every exit path.
    fn close(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (domain → cloud)
// ───────────────────────────────────────────────────────────────

/// Transmits one [`UploadRecord`].
pub trait TelemetryPort {
    fn upload(&mut self, record: &UploadRecord) -> core::result::Result<Ack, UploadError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`LinkPort::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// SSID or password failed validation.
    InvalidCredentials(&'static str),
    /// The radio driver refused the request.
    Driver(i32),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials(msg) => write!(f, "invalid credentials: {}", msg),
            Self::Driver(code) => write!(f, "driver error {}", code),
        }
    }
}
