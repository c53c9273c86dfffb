//! Hazard monitor firmware — main entry point.
//!
//! Hexagonal architecture with a single blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink    MonotonicClock         │
//! │  (Sensor+Actuator       (EventSink)     (ClockPort)            │
//! │   +StatusIndicator)                                            │
//! │  WifiAdapter            StdNetStack                            │
//! │  (LinkPort)             (NetStack)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            HazardMonitor (control loop)                │    │
//! │  │  HazardEvaluator · UploadScheduler · TelemetryPort     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ConnectivityManager (start-up gate) · Watchdog                │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info, warn};

use hazardmon::adapters::hardware::HardwareAdapter;
use hazardmon::adapters::log_sink::LogEventSink;
use hazardmon::adapters::net::StdNetStack;
use hazardmon::adapters::time::{BusyDelay, MonotonicClock};
use hazardmon::adapters::wifi::WifiAdapter;
use hazardmon::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort, TelemetryPort};
use hazardmon::app::service::HazardMonitor;
use hazardmon::config::{ConnectFailurePolicy, MonitorConfig};
use hazardmon::connectivity::{ConnectivityManager, ConnectivityState, signal_failure_forever};
use hazardmon::drivers::actuators::ActuatorController;
use hazardmon::drivers::gpio::GpioPin;
use hazardmon::drivers::hw_init;
use hazardmon::drivers::watchdog::Watchdog;
use hazardmon::error::Error;
use hazardmon::pins;
use hazardmon::sensors::SensorSampler;
use hazardmon::sensors::flame::FlameSensor;
use hazardmon::sensors::gas::{Adc1Channel, GasSensor};
use hazardmon::sensors::temperature::Dht;
use hazardmon::telemetry::{OfflineUplink, TelemetryUploader};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Hazard monitor v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = MonitorConfig::default();
    config.validate().map_err(Error::from)?;
    info!(
        "Thresholds: gas>{:.0}% temp>{:.0}C | upload every {}ms to {}:{}",
        config.gas_threshold_percent,
        config.temperature_threshold_c,
        config.upload_interval_ms,
        config.telemetry_host,
        config.telemetry_port
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Warm-up ────────────────────────────────────────────
    // DHT parts do not answer for about a second after power-up, so the
    // probe below must come after this.
    let mut clock = MonotonicClock::new();
    info!("System warming up...");
    clock.delay_ms(config.warmup_ms);
    watchdog.feed();

    // ── 5. Temperature sensor capability probe ────────────────
    let dht = Dht::probe(GpioPin::new(pins::DHT_GPIO), BusyDelay, &mut clock);
    info!("Temperature sensor: {:?}", dht.kind());
    watchdog.feed();

    let sampler = SensorSampler::new(
        GasSensor::new(Adc1Channel::new(pins::GAS_ADC1_CHANNEL)),
        FlameSensor::new(GpioPin::new(pins::FLAME_GPIO)),
        dht,
    );
    let actuators = ActuatorController::new(
        GpioPin::new(pins::BUZZER_GPIO),
        GpioPin::new(pins::LED_RED_GPIO),
        GpioPin::new(pins::LED_GREEN_GPIO),
        GpioPin::new(pins::PUMP_GPIO),
    );
    let mut hw = HardwareAdapter::new(sampler, actuators);
    let mut sink = LogEventSink::new();

    // ── 6. Network gate ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut link = WifiAdapter::new(EspWifi::new(peripherals.modem, sysloop, Some(nvs))?);

    let mut connectivity =
        ConnectivityManager::new(config.connect_attempts, config.connect_poll_interval_ms);
    let state = connectivity.connect(
        &mut link,
        &mut hw,
        &mut clock,
        &mut sink,
        &config.wifi_ssid,
        &config.wifi_password,
    );
    watchdog.feed();

    // ── 7. Control loop ───────────────────────────────────────
    match (state, config.connect_failure) {
        (ConnectivityState::Connected, _) => {
            let uplink = TelemetryUploader::new(StdNetStack::new(), &config);
            run(&config, uplink, true, &mut hw, &mut clock, &mut sink, &watchdog)
        }
        (_, ConnectFailurePolicy::LocalOnly) => {
            warn!("{}; running local safety loop without uplink", connectivity.failure());
            run(&config, OfflineUplink, false, &mut hw, &mut clock, &mut sink, &watchdog)
        }
        (_, ConnectFailurePolicy::Halt) => {
            error!("{}; halting in alarm", Error::from(connectivity.failure()));
            signal_failure_forever(&mut hw, &mut clock, config.failure_blink_ms, || {
                watchdog.feed();
            })
        }
    }
}

fn run<U: TelemetryPort>(
    config: &MonitorConfig,
    uplink: U,
    online: bool,
    hw: &mut (impl SensorPort + ActuatorPort),
    clock: &mut impl ClockPort,
    sink: &mut impl EventSink,
    watchdog: &Watchdog,
) -> ! {
    let mut monitor = HazardMonitor::new(config, uplink);
    monitor.start(online, sink);
    monitor.run_forever(hw, clock, sink, |_| watchdog.feed())
}
