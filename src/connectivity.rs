//! Network attachment.
//!
//! [`ConnectivityManager::connect`] is the start-up gate: association is
//! started once, then polled once per poll interval up to the attempt
//! budget, blinking the status indicator while it waits.
//!
//! ```text
//!  Disconnected ──begin──▶ poll ×N ──up──▶ Connected  (ready LEDs, chirp)
//!                              │
//!                              └──budget spent──▶ Failed (terminal)
//! ```

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LinkPort, StatusIndicator};
use crate::error::ConnectivityFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    Disconnected,
    Connected,
    Failed,
}

/// Drives one [`LinkPort`] through the start-up gate.
pub struct ConnectivityManager {
    state: ConnectivityState,
    attempts: u32,
    poll_interval_ms: u32,
}

impl ConnectivityManager {
    pub fn new(attempts: u32, poll_interval_ms: u32) -> Self {
        Self {
            state: ConnectivityState::Disconnected,
            attempts,
            poll_interval_ms,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Associate with `ssid` and wait for the link.
    ///
    /// Returns `Connected` or `Failed`; a rejected `begin` fails at once
    /// without polling.
    pub fn connect(
        &mut self,
        link: &mut impl LinkPort,
        indicator: &mut impl StatusIndicator,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        ssid: &str,
        password: &str,
    ) -> ConnectivityState {
        info!("Connecting to {}...", ssid);

        if let Err(e) = link.begin(ssid, password) {
            error!("Wi-Fi: {}", e);
            return self.fail(sink, 0);
        }

        let mut polls = 0u32;
        while polls < self.attempts {
            if link.is_connected() {
                break;
            }
            polls += 1;
            indicator.toggle_status();
            delay.delay_ms(self.poll_interval_ms);
        }

        if !link.is_connected() {
            return self.fail(sink, polls);
        }

        let ip = link.ip_addr();
        match ip {
            Some(ip) => info!("Connected! IP: {}", ip),
            None => info!("Connected!"),
        }
        indicator.show_ready();
        indicator.chirp(delay);
        sink.emit(&AppEvent::LinkUp {
            ip,
            attempts: polls,
        });
        self.state = ConnectivityState::Connected;
        self.state
    }

    /// The error to surface for a `Failed` gate.
    pub fn failure(&self) -> ConnectivityFailure {
        ConnectivityFailure {
            attempts: self.attempts,
        }
    }

    fn fail(&mut self, sink: &mut impl EventSink, polls: u32) -> ConnectivityState {
        warn!("Wi-Fi failed after {} polls", polls);
        sink.emit(&AppEvent::LinkFailed { attempts: polls });
        self.state = ConnectivityState::Failed;
        self.state
    }
}

/// Alarm trap for an unrecoverable link failure: toggle the indicator
/// every `period_ms` forever.  `on_blink` runs once per toggle (watchdog
/// feed).
pub fn signal_failure_forever(
    indicator: &mut impl StatusIndicator,
    delay: &mut impl DelayNs,
    period_ms: u32,
    mut on_blink: impl FnMut(),
) -> ! {
    loop {
        indicator.toggle_status();
        on_blink();
        delay.delay_ms(period_ms);
    }
}
