//! Control-loop integration tests.
//!
//! Drive [`HazardMonitor`] cycle by cycle against mock hardware, a
//! simulated clock and a scripted uplink, and check actuation, upload
//! scheduling, and fault handling end to end.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use hazardmon::adapters::hardware::HardwareAdapter;
use hazardmon::app::events::AppEvent;
use hazardmon::app::service::{CycleOutcome, HazardMonitor};
use hazardmon::config::MonitorConfig;
use hazardmon::drivers::actuators::{ActuatorCommand, ActuatorController};
use hazardmon::error::{Error, SensorReadError, UploadError};
use hazardmon::safety::HazardState;
use hazardmon::scheduler::{SchedulerState, UploadTrigger};
use hazardmon::sensors::SensorSampler;
use hazardmon::sensors::flame::FlameSensor;
use hazardmon::sensors::gas::{AdcChannel, GasSensor};
use hazardmon::sensors::temperature::{DhtKind, TemperatureDriver, decode_celsius};

use crate::mock_hw::{
    MockClock, MockHardware, RecordingSink, ScriptedUplink, SimTime, gas_leak_reading,
    safe_reading,
};

fn monitor(time: &SimTime) -> HazardMonitor<ScriptedUplink> {
    HazardMonitor::new(&MonitorConfig::default(), ScriptedUplink::new(time.clone()))
}

#[test]
fn gas_leak_actuates_and_uploads_immediately() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(safe_reading());
    hw.push(Ok(gas_leak_reading()));
    let mut m = monitor(&time);

    let out = m.run_once(&mut hw, &mut clock, &mut sink);

    let CycleOutcome::Completed {
        hazard,
        command,
        upload,
        ..
    } = out
    else {
        panic!("cycle faulted: {:?}", out);
    };
    assert_eq!(hazard, HazardState::Danger);
    assert_eq!(command, ActuatorCommand::DANGER);
    assert_eq!(upload.unwrap().trigger, UploadTrigger::AlertChanged);

    let rec = m.uplink().records[0];
    assert_eq!(rec.alert_code, 1);
    assert_eq!(rec.flame_code, 0);
    assert!((rec.gas_percent - 75.0).abs() < f32::EPSILON);

    // settle + idle
    assert_eq!(time.now(), 1_200);
    assert_eq!(
        m.scheduler_state(),
        SchedulerState {
            last_upload_ms: 0,
            last_alert_code: 1
        }
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DangerReading { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::UploadSent { .. })), 1);
}

#[test]
fn safe_loop_uploads_only_after_interval() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(safe_reading());
    let mut m = monitor(&time);

    while time.now() < 33_000 {
        m.run_once(&mut hw, &mut clock, &mut sink);
    }

    let stamps: Vec<u32> = m.uplink().records.iter().map(|r| r.timestamp_ms).collect();
    // 16000 is hit exactly by a cycle but is not past the interval.
    assert_eq!(stamps, [16_200, 32_400]);
    assert!(hw.applied.iter().all(|c| *c == ActuatorCommand::SAFE));
    assert_eq!(m.stats().uploads_ok, 2);
}

#[test]
fn upload_timeout_does_not_stop_the_next_cycle() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(safe_reading());
    hw.push(Ok(gas_leak_reading()));
    let uplink = ScriptedUplink::new(time.clone()).then(6_000, Err(UploadError::Timeout));
    let mut m = HazardMonitor::new(&MonitorConfig::default(), uplink);

    let first = m.run_once(&mut hw, &mut clock, &mut sink);
    let CycleOutcome::Completed { upload, .. } = first else {
        panic!("upload failure must not fault the cycle");
    };
    let attempt = upload.unwrap();
    assert_eq!(attempt.result, Err(UploadError::Timeout));
    assert_eq!(attempt.elapsed_ms, 6_000);
    // timeout + settle + idle
    assert_eq!(time.now(), 7_200);

    let second = m.run_once(&mut hw, &mut clock, &mut sink);
    assert!(matches!(
        second,
        CycleOutcome::Completed {
            hazard: HazardState::Danger,
            upload: None,
            ..
        }
    ));
    assert_eq!(hw.samples, 2);
    assert_eq!(hw.applied.len(), 2);
    assert_eq!(m.stats().uploads_failed, 1);
    assert_eq!(m.stats().longest_upload_ms, 6_000);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::UploadSkipped {
                error: UploadError::Timeout,
                ..
            }
        )),
        1
    );
}

#[test]
fn both_alert_edges_upload() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(safe_reading());
    hw.push(Ok(gas_leak_reading())).push(Ok(safe_reading()));
    let mut m = monitor(&time);

    m.run_once(&mut hw, &mut clock, &mut sink);
    m.run_once(&mut hw, &mut clock, &mut sink);
    m.run_once(&mut hw, &mut clock, &mut sink);

    let alerts: Vec<u8> = m.uplink().records.iter().map(|r| r.alert_code).collect();
    assert_eq!(alerts, [1, 0]);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::HazardChanged {
                from: HazardState::Danger,
                to: HazardState::Safe,
                ..
            }
        )),
        1
    );
    assert_eq!(hw.last_command(), Some(ActuatorCommand::SAFE));
}

#[test]
fn sensor_fault_backs_off_and_keeps_previous_outputs() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(safe_reading());
    hw.push(Ok(gas_leak_reading()))
        .push(Err(SensorReadError::GpioReadFailed.into()));
    let mut m = monitor(&time);

    m.run_once(&mut hw, &mut clock, &mut sink);
    let before = time.now();
    let out = m.run_once(&mut hw, &mut clock, &mut sink);

    assert_eq!(
        out,
        CycleOutcome::Faulted(Error::Sensor(SensorReadError::GpioReadFailed))
    );
    assert_eq!(time.now() - before, 1_000);
    assert_eq!(hw.applied.len(), 1);
    assert_eq!(hw.last_command(), Some(ActuatorCommand::DANGER));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CycleFault(_))), 1);

    // Next cycle recovers with the repeated reading.
    let out = m.run_once(&mut hw, &mut clock, &mut sink);
    assert!(matches!(out, CycleOutcome::Completed { .. }));
    assert_eq!(hw.applied.len(), 2);
    assert_eq!(m.stats().faulted_cycles, 1);
    assert_eq!(m.stats().cycles, 3);
}

#[test]
fn counter_wrap_keeps_periodic_uploads_going() {
    let time = SimTime::default();
    let t0 = u32::MAX - 500;
    time.set(t0);
    let mut clock = MockClock::new(time.clone());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(gas_leak_reading());
    let mut m = monitor(&time);

    for _ in 0..80 {
        m.run_once(&mut hw, &mut clock, &mut sink);
    }

    // Alert change at t0, then the periodic upload 16.2 s later, past the
    // counter wrap.
    let stamps: Vec<u32> = m.uplink().records.iter().map(|r| r.timestamp_ms).collect();
    assert_eq!(stamps, [t0, t0.wrapping_add(16_200)]);
    assert_eq!(stamps[1], 15_699);
}

// ── Real sampler behind the hardware adapter ──────────────────

struct Adc(u16);
impl AdcChannel for Adc {
    fn read_u16(&mut self) -> Result<u16, SensorReadError> {
        Ok(self.0)
    }
}

struct Level(bool);
impl ErrorType for Level {
    type Error = Infallible;
}
impl InputPin for Level {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0)
    }
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0)
    }
}
impl OutputPin for Level {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0 = false;
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0 = true;
        Ok(())
    }
}
impl StatefulOutputPin for Level {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0)
    }
    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0)
    }
}

struct Thermo(Result<f32, SensorReadError>);
impl TemperatureDriver for Thermo {
    fn measure(&mut self) -> Result<f32, SensorReadError> {
        self.0
    }
}

fn board(
    raw: u16,
    flame_pin_high: bool,
    temp: Result<f32, SensorReadError>,
) -> HardwareAdapter<Adc, Level, Thermo, Level> {
    HardwareAdapter::new(
        SensorSampler::new(
            GasSensor::new(Adc(raw)),
            FlameSensor::new(Level(flame_pin_high)),
            Thermo(temp),
        ),
        ActuatorController::new(Level(false), Level(false), Level(false), Level(false)),
    )
}

fn one_cycle(hw: &mut HardwareAdapter<Adc, Level, Thermo, Level>) -> CycleOutcome {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut m = monitor(&time);
    m.run_once(hw, &mut clock, &mut RecordingSink::new())
}

#[test]
fn full_scale_gas_and_flame_is_danger_whatever_the_temperature() {
    let mut hw = board(65_535, false, Err(SensorReadError::Timeout));
    let CycleOutcome::Completed {
        reading, hazard, ..
    } = one_cycle(&mut hw)
    else {
        panic!("cycle faulted");
    };
    assert!((reading.gas_percent - 100.0).abs() < f32::EPSILON);
    assert!(reading.flame_detected);
    assert!(!reading.temperature_valid);
    assert_eq!(hazard, HazardState::Danger);
    assert_eq!(hw.actuators().last_command(), Some(ActuatorCommand::DANGER));
}

#[test]
fn failed_thermometer_does_not_raise_an_alarm() {
    let mut hw = board(1_000, true, Err(SensorReadError::ChecksumMismatch));
    let out = one_cycle(&mut hw);
    assert!(matches!(
        out,
        CycleOutcome::Completed {
            hazard: HazardState::Safe,
            ..
        }
    ));
    assert_eq!(hw.sampler().temperature_failures(), 1);
}

#[test]
fn hot_room_alone_is_danger() {
    let mut hw = board(0, true, Ok(50.5));
    let out = one_cycle(&mut hw);
    assert!(matches!(
        out,
        CycleOutcome::Completed {
            hazard: HazardState::Danger,
            ..
        }
    ));
}

#[test]
fn misidentified_thermometer_does_not_raise_an_alarm() {
    // DHT11 frame (45 %RH, 24.3 C) read with the fallback DHT22 layout.
    let mut frame = [45, 0, 24, 3, 0];
    frame[4] = frame[..4].iter().fold(0u8, |a, b| a.wrapping_add(*b));
    let mut hw = board(0, true, decode_celsius(DhtKind::FALLBACK, &frame));
    let CycleOutcome::Completed {
        reading, hazard, ..
    } = one_cycle(&mut hw)
    else {
        panic!("cycle faulted");
    };
    assert!(!reading.temperature_valid);
    assert_eq!(hazard, HazardState::Safe);
    assert_eq!(hw.actuators().last_command(), Some(ActuatorCommand::SAFE));
}
