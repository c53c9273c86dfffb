//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::safety::causes;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Comma-separated cause names for `mask`.
fn cause_list(mask: u8) -> heapless::String<48> {
    let mut out = heapless::String::new();
    for (i, c) in causes(mask).enumerate() {
        if i > 0 {
            let _ = out.push_str(",");
        }
        let _ = core::fmt::Write::write_fmt(&mut out, format_args!("{}", c));
    }
    out
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { uplink_online } => {
                info!(
                    "START | control loop running | uplink={}",
                    if *uplink_online { "online" } else { "offline" }
                );
            }
            AppEvent::HazardChanged { from, to, causes } => {
                info!("HAZARD | {} -> {} | causes=[{}]", from, to, cause_list(*causes));
            }
            AppEvent::DangerReading { reading, causes } => {
                warn!(
                    "HAZARD | DANGER! Pump activated | gas={:.1}% flame={} causes=[{}]",
                    reading.gas_percent,
                    reading.flame_code(),
                    cause_list(*causes)
                );
            }
            AppEvent::UploadSent {
                trigger,
                reading,
                alert_code,
                elapsed_ms,
            } => {
                info!(
                    "UPLINK | cloud updated ({:?}) | gas={:.1}% flame={} alert={} T={:.1}\u{00b0}C | {}ms",
                    trigger,
                    reading.gas_percent,
                    reading.flame_code(),
                    alert_code,
                    reading.temperature_c,
                    elapsed_ms
                );
            }
            AppEvent::UploadSkipped {
                trigger,
                error,
                elapsed_ms,
            } => {
                warn!("UPLINK | upload skipped ({:?}): {} | {}ms", trigger, error, elapsed_ms);
            }
            AppEvent::CycleFault(e) => {
                warn!("FAULT | cycle failed: {} | policy={:?}", e, e.policy());
            }
            AppEvent::LinkUp { ip, attempts } => match ip {
                Some(ip) => info!("UPLINK | link up, IP {} after {} polls", ip, attempts),
                None => info!("UPLINK | link up after {} polls", attempts),
            },
            AppEvent::LinkFailed { attempts } => {
                warn!("FAULT | link failed after {} polls", attempts);
            }
        }
    }
}
