//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`], the hexagonal boundary for layer-2 network
//! attachment.  Credentials are validated before they reach the radio.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation that comes up after a fixed number
//!   of polls, for host-side tests.

use std::net::Ipv4Addr;

use log::info;

use crate::app::ports::{LinkError, LinkPort};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

/// Every byte in `0x20..=0x7E`.
fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), LinkError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(LinkError::InvalidCredentials(
            "SSID must be 1-32 printable ASCII bytes",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), LinkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(LinkError::InvalidCredentials(
            "password must be 8-64 bytes for WPA2, or empty for open",
        ));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim_up_after: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: u32,
    started: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            wifi,
            started: false,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    /// Simulated station that reports connected on the poll after
    /// `up_after` unsuccessful ones.  `None` never connects.
    pub fn simulated(up_after: Option<u32>) -> Self {
        Self {
            sim_up_after: up_after,
            sim_polls: 0,
            started: false,
        }
    }
}

impl WifiAdapter {
    pub fn is_started(&self) -> bool {
        self.started
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| LinkError::InvalidCredentials("SSID too long"))?,
            password: password
                .try_into()
                .map_err(|_| LinkError::InvalidCredentials("password too long"))?,
            auth_method,
            ..Default::default()
        });
        self.wifi
            .set_configuration(&config)
            .map_err(|e| LinkError::Driver(e.code()))?;
        self.wifi.start().map_err(|e| LinkError::Driver(e.code()))?;
        self.wifi.connect().map_err(|e| LinkError::Driver(e.code()))?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, ssid: &str, _password: &str) -> Result<(), LinkError> {
        info!("WiFi(sim): associating with '{}'", ssid);
        self.sim_polls = 0;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&mut self) -> bool {
        let up = self.sim_up_after.is_some_and(|n| self.sim_polls >= n);
        self.sim_polls = self.sim_polls.saturating_add(1);
        up
    }

    #[cfg(target_os = "espidf")]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        self.sim_up_after
            .is_some_and(|n| self.sim_polls > n)
            .then_some(Ipv4Addr::new(192, 168, 4, 2))
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.platform_begin(ssid, password)?;
        self.started = true;
        info!("WiFi: association started (SSID='{}')", ssid);
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.started && self.platform_is_connected()
    }

    fn ip_addr(&self) -> Option<Ipv4Addr> {
        if self.started { self.platform_ip() } else { None }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
