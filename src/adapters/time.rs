//! ESP32 time adapter.
//!
//! Provides the millisecond tick source and the blocking delays used by
//! the control loop and the sensor drivers.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic) and
//!   `esp_rom_delay_us` for busy-waits.
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

use embedded_hal::delay::DelayNs;

use crate::app::ports::ClockPort;

/// Monotonic millisecond clock whose delays yield the task.
///
/// `now_ms` truncates the 64-bit microsecond timer to a wrapping `u32`.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Seconds since boot (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.uptime_us() / 1_000_000
    }
}

impl DelayNs for MonotonicClock {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

impl ClockPort for MonotonicClock {
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }
}

/// Busy-wait delay for microsecond bit timing (DHT single-wire bus).
/// Never yields; keep calls short.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusyDelay;

impl DelayNs for BusyDelay {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(ns.div_ceil(1_000)) };
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        let until = std::time::Instant::now() + std::time::Duration::from_nanos(u64::from(ns));
        while std::time::Instant::now() < until {
            core::hint::spin_loop();
        }
    }
}
