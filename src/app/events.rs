//! Outbound application events.
//!
//! The [`HazardMonitor`](super::service::HazardMonitor) and the
//! connectivity manager emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log today).

use std::net::Ipv4Addr;

use crate::error::{Error, UploadError};
use crate::safety::HazardState;
use crate::scheduler::UploadTrigger;
use crate::sensors::SensorReading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The control loop is about to run its first cycle.
    Started { uplink_online: bool },

    /// The hazard classification changed between consecutive cycles.
    HazardChanged {
        from: HazardState,
        to: HazardState,
        causes: u8,
    },

    /// A cycle ended in danger (emitted every such cycle).
    DangerReading { reading: SensorReading, causes: u8 },

    /// An upload completed.
    UploadSent {
        trigger: UploadTrigger,
        reading: SensorReading,
        alert_code: u8,
        elapsed_ms: u32,
    },

    /// An upload was attempted and failed; the scheduler still advanced.
    UploadSkipped {
        trigger: UploadTrigger,
        error: UploadError,
        elapsed_ms: u32,
    },

    /// A cycle body failed and the loop is backing off.
    CycleFault(Error),

    /// The network link came up.
    LinkUp { ip: Option<Ipv4Addr>, attempts: u32 },

    /// The network link did not come up within the attempt budget.
    LinkFailed { attempts: u32 },
}
