//! Control loop — the hexagonal core.
//!
//! [`HazardMonitor`] owns the evaluator, the upload scheduler and its
//! state, and the uplink.  Sensors, actuators, the clock and the event
//! sink are injected at call sites, so every cycle runs the same against
//! real hardware and against mocks.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │        HazardMonitor          │
//! ActuatorPort ◀──│ evaluate · schedule · upload  │──▶ TelemetryPort
//!                 └──────────────────────────────┘
//! ```
//!
//! One cycle: sample → evaluate → actuate → maybe upload → idle.
//! A failed cycle body is logged and followed by the fault backoff instead
//! of the idle delay.  Outputs written before the failure stay as they are.

use log::{info, warn};

use crate::config::MonitorConfig;
use crate::diagnostics::LoopStats;
use crate::drivers::actuators::ActuatorCommand;
use crate::error::{Error, FaultPolicy, Result};
use crate::safety::{HazardEvaluator, HazardState};
use crate::scheduler::{SchedulerState, UploadAttempt, UploadScheduler};
use crate::sensors::SensorReading;

use super::events::AppEvent;
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort, TelemetryPort};

/// What one call to [`HazardMonitor::run_once`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    Completed {
        reading: SensorReading,
        hazard: HazardState,
        command: ActuatorCommand,
        upload: Option<UploadAttempt>,
    },
    Faulted(Error),
}

/// The control loop.
pub struct HazardMonitor<U> {
    evaluator: HazardEvaluator,
    scheduler: UploadScheduler,
    sched_state: SchedulerState,
    uplink: U,
    idle_delay_ms: u32,
    fault_backoff_ms: u32,
    last_hazard: Option<HazardState>,
    stats: LoopStats,
}

impl<U: TelemetryPort> HazardMonitor<U> {
    pub fn new(config: &MonitorConfig, uplink: U) -> Self {
        Self {
            evaluator: HazardEvaluator::new(config),
            scheduler: UploadScheduler::new(config),
            sched_state: SchedulerState::default(),
            uplink,
            idle_delay_ms: config.idle_delay_ms,
            fault_backoff_ms: config.fault_backoff_ms,
            last_hazard: None,
            stats: LoopStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, uplink_online: bool, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started { uplink_online });
        info!("System active (uplink {})", if uplink_online { "online" } else { "offline" });
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run the cycle body once, without the trailing delay.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] to avoid a double mutable borrow while keeping the
    /// port boundary explicit.
    pub fn cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<CycleOutcome> {
        // 1. Sample
        let reading = hw.sample()?;

        // 2. Evaluate
        let (hazard, causes) = self.evaluator.classify(&reading);

        // 3. Actuate
        let command = hw.apply(hazard);

        if let Some(prev) = self.last_hazard {
            if prev != hazard {
                sink.emit(&AppEvent::HazardChanged {
                    from: prev,
                    to: hazard,
                    causes,
                });
            }
        }
        self.last_hazard = Some(hazard);

        if hazard.is_danger() {
            self.stats.danger_cycles = self.stats.danger_cycles.saturating_add(1);
            sink.emit(&AppEvent::DangerReading { reading, causes });
        }

        // 4. Maybe upload
        let now = clock.now_ms();
        let (next, upload) = self.scheduler.maybe_upload(
            now,
            &reading,
            hazard,
            self.sched_state,
            &mut self.uplink,
            clock,
        );
        self.sched_state = next;

        if let Some(attempt) = upload {
            self.stats
                .record_upload(attempt.result.is_ok(), attempt.elapsed_ms);
            let event = match attempt.result {
                Ok(_) => AppEvent::UploadSent {
                    trigger: attempt.trigger,
                    reading,
                    alert_code: hazard.alert_code(),
                    elapsed_ms: attempt.elapsed_ms,
                },
                Err(error) => AppEvent::UploadSkipped {
                    trigger: attempt.trigger,
                    error,
                    elapsed_ms: attempt.elapsed_ms,
                },
            };
            sink.emit(&event);
        }

        Ok(CycleOutcome::Completed {
            reading,
            hazard,
            command,
            upload,
        })
    }

    /// One full cycle including its trailing delay: the idle delay after a
    /// clean cycle, the fault backoff after a failed one.
    pub fn run_once(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.stats.cycles = self.stats.cycles.wrapping_add(1);
        match self.cycle(hw, clock, sink) {
            Ok(outcome) => {
                clock.delay_ms(self.idle_delay_ms);
                outcome
            }
            Err(e) => {
                self.stats.faulted_cycles = self.stats.faulted_cycles.saturating_add(1);
                if e.policy() != FaultPolicy::Backoff {
                    warn!("cycle fault with policy {:?}, backing off anyway", e.policy());
                }
                sink.emit(&AppEvent::CycleFault(e));
                clock.delay_ms(self.fault_backoff_ms);
                CycleOutcome::Faulted(e)
            }
        }
    }

    /// Run cycles forever, calling `between` after each one.
    pub fn run_forever(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
        mut between: impl FnMut(&CycleOutcome),
    ) -> ! {
        loop {
            let outcome = self.run_once(hw, clock, sink);
            between(&outcome);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.sched_state
    }

    pub fn uplink(&self) -> &U {
        &self.uplink
    }

    /// Hazard state of the last completed cycle.
    pub fn hazard(&self) -> Option<HazardState> {
        self.last_hazard
    }
}
