//! Alarm and suppression outputs.
//!
//! Four discrete outputs are driven as one unit from the hazard state:
//!
//! | Output    | Safe | Danger |
//! |-----------|------|--------|
//! | buzzer    | high | low    |
//! | red LED   | low  | high   |
//! | green LED | high | low    |
//! | pump      | low  | high   |
//!
//! The buzzer is wired active-low, so "on" (pin high) is the *silent*
//! level.  The table is applied as-is; nothing here reinterprets it.
//!
//! The controller also carries the status-indicator patterns used while
//! the network link comes up (red blink, green ready, short chirp).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, StatefulOutputPin};
use log::warn;

use crate::safety::HazardState;

/// Buzzer pin-high time for the "link up" acknowledgement.
pub const CHIRP_MS: u32 = 100;

/// Levels written to the four outputs.  `true` = pin high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub buzzer: bool,
    pub led_red: bool,
    pub led_green: bool,
    pub pump: bool,
}

impl ActuatorCommand {
    pub const SAFE: Self = Self {
        buzzer: true,
        led_red: false,
        led_green: true,
        pump: false,
    };

    pub const DANGER: Self = Self {
        buzzer: false,
        led_red: true,
        led_green: false,
        pump: true,
    };

    /// The canonical command for `state`.
    pub const fn for_state(state: HazardState) -> Self {
        match state {
            HazardState::Safe => Self::SAFE,
            HazardState::Danger => Self::DANGER,
        }
    }
}

/// Owns the four output pins.
pub struct ActuatorController<P> {
    buzzer: P,
    led_red: P,
    led_green: P,
    pump: P,
    last: Option<ActuatorCommand>,
}

impl<P> ActuatorController<P>
where
    P: OutputPin + StatefulOutputPin,
{
    pub fn new(buzzer: P, led_red: P, led_green: P, pump: P) -> Self {
        Self {
            buzzer,
            led_red,
            led_green,
            pump,
            last: None,
        }
    }

    /// Drive every output to the canonical levels for `state`.
    ///
    /// All four pins are written on every call.  A failed write is logged
    /// and the remaining pins are still written.
    pub fn apply(&mut self, state: HazardState) -> ActuatorCommand {
        let cmd = ActuatorCommand::for_state(state);
        write_level(&mut self.buzzer, cmd.buzzer, "buzzer");
        write_level(&mut self.led_red, cmd.led_red, "red LED");
        write_level(&mut self.led_green, cmd.led_green, "green LED");
        write_level(&mut self.pump, cmd.pump, "pump");
        self.last = Some(cmd);
        cmd
    }

    /// Last command written by [`apply`](Self::apply), if any.
    pub fn last_command(&self) -> Option<ActuatorCommand> {
        self.last
    }

    /// Invert the red LED (connect-in-progress / failure blink).
    pub fn toggle_status(&mut self) {
        if self.led_red.toggle().is_err() {
            warn!("actuator: red LED toggle failed");
        }
    }

    /// Steady "link ready" pattern: red off, green on.
    pub fn show_ready(&mut self) {
        write_level(&mut self.led_red, false, "red LED");
        write_level(&mut self.led_green, true, "green LED");
    }

    /// Short buzzer pulse: pin high for [`CHIRP_MS`], then low.
    pub fn chirp(&mut self, delay: &mut impl DelayNs) {
        write_level(&mut self.buzzer, true, "buzzer");
        delay.delay_ms(CHIRP_MS);
        write_level(&mut self.buzzer, false, "buzzer");
    }
}

fn write_level<P: OutputPin>(pin: &mut P, high: bool, name: &str) {
    let res = if high { pin.set_high() } else { pin.set_low() };
    if res.is_err() {
        warn!("actuator: {} write failed", name);
    }
}
