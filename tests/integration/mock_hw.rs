//! Mock adapters for integration tests.
//!
//! Records every actuator and indicator call so tests can assert on the
//! full history without touching real GPIO, sockets, or timers.  The clock
//! and the uplink share one simulated time base so a slow upload shows up
//! as elapsed loop time.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use hazardmon::app::events::AppEvent;
use hazardmon::app::ports::{
    ActuatorPort, ClockPort, EventSink, SensorPort, StatusIndicator, TelemetryPort,
};
use hazardmon::drivers::actuators::ActuatorCommand;
use hazardmon::error::{Result, UploadError};
use hazardmon::safety::HazardState;
use hazardmon::sensors::SensorReading;
use hazardmon::telemetry::{Ack, UploadRecord};

// ── Readings ──────────────────────────────────────────────────

pub fn safe_reading() -> SensorReading {
    SensorReading {
        gas_percent: 20.0,
        flame_detected: false,
        temperature_c: 24.0,
        temperature_valid: true,
    }
}

pub fn gas_leak_reading() -> SensorReading {
    SensorReading {
        gas_percent: 75.0,
        ..safe_reading()
    }
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensor + actuator + indicator mock.  Readings are scripted; once the
/// script runs out the last reading repeats.
pub struct MockHardware {
    script: VecDeque<Result<SensorReading>>,
    fallback: SensorReading,
    pub samples: u32,
    pub applied: Vec<ActuatorCommand>,
    pub toggles: u32,
    pub ready: bool,
    pub chirps: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(fallback: SensorReading) -> Self {
        Self {
            script: VecDeque::new(),
            fallback,
            samples: 0,
            applied: Vec::new(),
            toggles: 0,
            ready: false,
            chirps: 0,
        }
    }

    pub fn push(&mut self, reading: Result<SensorReading>) -> &mut Self {
        self.script.push_back(reading);
        self
    }

    pub fn last_command(&self) -> Option<ActuatorCommand> {
        self.applied.last().copied()
    }
}

impl SensorPort for MockHardware {
    fn sample(&mut self) -> Result<SensorReading> {
        self.samples += 1;
        match self.script.pop_front() {
            Some(Ok(r)) => {
                self.fallback = r;
                Ok(r)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.fallback),
        }
    }
}

impl ActuatorPort for MockHardware {
    fn apply(&mut self, state: HazardState) -> ActuatorCommand {
        let cmd = ActuatorCommand::for_state(state);
        self.applied.push(cmd);
        cmd
    }
}

impl StatusIndicator for MockHardware {
    fn toggle_status(&mut self) {
        self.toggles += 1;
    }

    fn show_ready(&mut self) {
        self.ready = true;
    }

    fn chirp(&mut self, delay: &mut impl DelayNs) {
        self.chirps += 1;
        delay.delay_ms(100);
    }
}

// ── Simulated time ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimTime(Rc<Cell<u32>>);

impl SimTime {
    pub fn now(&self) -> u32 {
        self.0.get()
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }
}

/// Clock whose delays advance [`SimTime`] instantly.
pub struct MockClock {
    pub time: SimTime,
    pub slept_ms: u64,
}

impl MockClock {
    pub fn new(time: SimTime) -> Self {
        Self { time, slept_ms: 0 }
    }
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        let ms = ns / 1_000_000;
        self.slept_ms += u64::from(ms);
        self.time.advance(ms);
    }

    fn delay_us(&mut self, us: u32) {
        let ms = us / 1_000;
        self.slept_ms += u64::from(ms);
        self.time.advance(ms);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.slept_ms += u64::from(ms);
        self.time.advance(ms);
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u32 {
        self.time.now()
    }
}

// ── Uplink ────────────────────────────────────────────────────

/// Telemetry mock.  Each scripted entry is `(latency_ms, result)`; the
/// latency is added to [`SimTime`] before the result is returned.  When the
/// script runs out every upload succeeds instantly.
pub struct ScriptedUplink {
    time: SimTime,
    script: VecDeque<(u32, core::result::Result<Ack, UploadError>)>,
    pub records: Vec<UploadRecord>,
}

#[allow(dead_code)]
impl ScriptedUplink {
    pub fn new(time: SimTime) -> Self {
        Self {
            time,
            script: VecDeque::new(),
            records: Vec::new(),
        }
    }

    pub fn then(mut self, latency_ms: u32, result: core::result::Result<Ack, UploadError>) -> Self {
        self.script.push_back((latency_ms, result));
        self
    }
}

impl TelemetryPort for ScriptedUplink {
    fn upload(&mut self, record: &UploadRecord) -> core::result::Result<Ack, UploadError> {
        self.records.push(*record);
        let (latency, result) = self
            .script
            .pop_front()
            .unwrap_or((0, Ok(Ack { bytes_received: 17 })));
        self.time.advance(latency);
        result
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
