//! Upload scheduler.
//!
//! Decides, once per cycle, whether the current reading goes to the
//! cloud.  Two independent triggers:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                        │
//! │                                                            │
//! │   ┌──────────────────────┐     ┌──────────────────────┐    │
//! │   │ Periodic             │     │ Alert change         │    │
//! │   │ now - last > 16 s    │     │ alert != last alert  │    │
//! │   └──────────┬───────────┘     └──────────┬───────────┘    │
//! │              └─────────────┬──────────────┘                │
//! │                            ▼                               │
//! │              TelemetryPort::upload (blocking)              │
//! │                            ▼                               │
//! │          state ← (now, alert)   ·   settle 1 s             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The alert-change trigger fires on *both* edges (Safe→Danger and
//! Danger→Safe).  The state advances whether or not the upload worked,
//! so a dead network costs one attempt per interval, not one per cycle.
//!
//! [`SchedulerState`] is a plain value threaded through the caller; the
//! scheduler itself holds only configuration.

use crate::app::ports::{ClockPort, TelemetryPort};
use crate::config::MonitorConfig;
use crate::error::UploadError;
use crate::safety::HazardState;
use crate::sensors::SensorReading;
use crate::telemetry::{Ack, UploadRecord};
use log::debug;

/// Signed distance from `earlier` to `later` on a wrapping `u32`
/// millisecond counter.  Correct as long as the real gap is under ~24 days.
pub const fn ticks_diff(later: u32, earlier: u32) -> i32 {
    later.wrapping_sub(earlier) as i32
}

/// Scheduler memory carried from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerState {
    /// Tick of the last attempt (successful or not).
    pub last_upload_ms: u32,
    /// Alert code sent with the last attempt.
    pub last_alert_code: u8,
}

/// Why an upload fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTrigger {
    /// The upload interval elapsed.
    Periodic,
    /// The alert code differs from the one last sent.
    AlertChanged,
}

/// Outcome of one fired upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadAttempt {
    pub trigger: UploadTrigger,
    pub result: Result<Ack, UploadError>,
    /// Wall time the upload call blocked the loop.
    pub elapsed_ms: u32,
}

/// Upload decision + execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadScheduler {
    interval_ms: u32,
    settle_ms: u32,
}

impl UploadScheduler {
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_timing(config.upload_interval_ms, config.settle_delay_ms)
    }

    pub const fn with_timing(interval_ms: u32, settle_ms: u32) -> Self {
        Self {
            interval_ms,
            settle_ms,
        }
    }

    /// Which trigger, if any, fires at `now` for `alert_code`.
    ///
    /// The alert change wins when both hold.
    pub fn trigger(&self, now: u32, alert_code: u8, state: &SchedulerState) -> Option<UploadTrigger> {
        if alert_code != state.last_alert_code {
            Some(UploadTrigger::AlertChanged)
        } else if ticks_diff(now, state.last_upload_ms) > self.interval_ms as i32 {
            Some(UploadTrigger::Periodic)
        } else {
            None
        }
    }

    /// Upload `reading` if a trigger fires at `now`.
    ///
    /// On firing: one blocking [`TelemetryPort::upload`], the state is set
    /// to `(now, alert)` regardless of the result, then the clock sleeps the
    /// settle delay.  Otherwise the state is returned unchanged and no I/O
    /// happens.
    pub fn maybe_upload(
        &self,
        now: u32,
        reading: &SensorReading,
        hazard: HazardState,
        state: SchedulerState,
        uplink: &mut impl TelemetryPort,
        clock: &mut impl ClockPort,
    ) -> (SchedulerState, Option<UploadAttempt>) {
        let alert_code = hazard.alert_code();
        let Some(trigger) = self.trigger(now, alert_code, &state) else {
            return (state, None);
        };

        debug!(
            "scheduler: {:?} upload (last={} now={} alert {}->{})",
            trigger, state.last_upload_ms, now, state.last_alert_code, alert_code
        );

        let record = UploadRecord::from_reading(now, reading, hazard);
        let started = clock.now_ms();
        let result = uplink.upload(&record);
        let elapsed_ms = clock.now_ms().wrapping_sub(started);

        let next = SchedulerState {
            last_upload_ms: now,
            last_alert_code: alert_code,
        };

        clock.delay_ms(self.settle_ms);

        (
            next,
            Some(UploadAttempt {
                trigger,
                result,
                elapsed_ms,
            }),
        )
    }
}
