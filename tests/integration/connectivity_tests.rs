//! Start-up gate integration tests.
//!
//! Run the connectivity manager against the simulated Wi-Fi adapter and the
//! mock indicator, then check both failure policies: halt (the alarm trap
//! is not entered here, only its precondition) and local-only operation
//! with an offline uplink.

use hazardmon::adapters::wifi::WifiAdapter;
use hazardmon::app::events::AppEvent;
use hazardmon::app::service::{CycleOutcome, HazardMonitor};
use hazardmon::config::{ConnectFailurePolicy, MonitorConfig};
use hazardmon::connectivity::{ConnectivityManager, ConnectivityState};
use hazardmon::drivers::actuators::ActuatorCommand;
use hazardmon::error::{Error, FaultPolicy, UploadError};
use hazardmon::telemetry::OfflineUplink;

use crate::mock_hw::{
    MockClock, MockHardware, RecordingSink, SimTime, gas_leak_reading, safe_reading,
};

fn gate(
    link: &mut WifiAdapter,
    hw: &mut MockHardware,
    clock: &mut MockClock,
    sink: &mut RecordingSink,
) -> ConnectivityState {
    let config = MonitorConfig::default();
    ConnectivityManager::new(config.connect_attempts, config.connect_poll_interval_ms).connect(
        link,
        hw,
        clock,
        sink,
        "HomeWiFi",
        "mysecret8",
    )
}

#[test]
fn link_up_shows_ready_and_chirps() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut hw = MockHardware::new(safe_reading());
    let mut sink = RecordingSink::new();
    let mut link = WifiAdapter::simulated(Some(4));

    let state = gate(&mut link, &mut hw, &mut clock, &mut sink);

    assert_eq!(state, ConnectivityState::Connected);
    assert_eq!(hw.toggles, 4);
    assert!(hw.ready);
    assert_eq!(hw.chirps, 1);
    // four 1 s polls + the 100 ms chirp
    assert_eq!(time.now(), 4_100);
    assert!(matches!(
        sink.events[..],
        [AppEvent::LinkUp {
            ip: Some(_),
            attempts: 4
        }]
    ));
}

#[test]
fn dead_link_fails_after_twenty_polls() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut hw = MockHardware::new(safe_reading());
    let mut sink = RecordingSink::new();
    let mut link = WifiAdapter::simulated(None);

    let state = gate(&mut link, &mut hw, &mut clock, &mut sink);

    assert_eq!(state, ConnectivityState::Failed);
    assert_eq!(hw.toggles, 20);
    assert!(!hw.ready);
    assert_eq!(hw.chirps, 0);
    assert_eq!(time.now(), 20_000);
    assert_eq!(sink.events, [AppEvent::LinkFailed { attempts: 20 }]);
}

#[test]
fn default_policy_treats_failure_as_fatal() {
    let config = MonitorConfig::default();
    assert_eq!(config.connect_failure, ConnectFailurePolicy::Halt);
    let mgr = ConnectivityManager::new(config.connect_attempts, config.connect_poll_interval_ms);
    assert_eq!(Error::from(mgr.failure()).policy(), FaultPolicy::Fatal);
}

#[test]
fn local_only_keeps_actuating_without_uplink() {
    let time = SimTime::default();
    let mut clock = MockClock::new(time.clone());
    let mut hw = MockHardware::new(safe_reading());
    let mut sink = RecordingSink::new();
    let mut link = WifiAdapter::simulated(None);

    let state = gate(&mut link, &mut hw, &mut clock, &mut sink);
    assert_eq!(state, ConnectivityState::Failed);

    let config = MonitorConfig {
        connect_failure: ConnectFailurePolicy::LocalOnly,
        ..MonitorConfig::default()
    };
    let mut monitor = HazardMonitor::new(&config, OfflineUplink);
    monitor.start(false, &mut sink);

    hw.push(Ok(gas_leak_reading()));
    let out = monitor.run_once(&mut hw, &mut clock, &mut sink);

    let CycleOutcome::Completed { command, upload, .. } = out else {
        panic!("cycle faulted: {:?}", out);
    };
    assert_eq!(command, ActuatorCommand::DANGER);
    assert_eq!(upload.unwrap().result, Err(UploadError::Offline));
    assert_eq!(monitor.stats().uploads_failed, 1);
    assert!(sink.events.contains(&AppEvent::Started {
        uplink_online: false
    }));
}
