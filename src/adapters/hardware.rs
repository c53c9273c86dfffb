//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorSampler`] and the [`ActuatorController`], exposing them
//! through [`SensorPort`], [`ActuatorPort`] and [`StatusIndicator`].  This
//! is the only module that touches the board.  On non-espidf targets the
//! underlying pins use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};

use crate::app::ports::{ActuatorPort, SensorPort, StatusIndicator};
use crate::drivers::actuators::{ActuatorCommand, ActuatorController};
use crate::error::Result;
use crate::safety::HazardState;
use crate::sensors::gas::AdcChannel;
use crate::sensors::temperature::TemperatureDriver;
use crate::sensors::{SensorReading, SensorSampler};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A, F, T, P> {
    sampler: SensorSampler<A, F, T>,
    actuators: ActuatorController<P>,
}

impl<A, F, T, P> HardwareAdapter<A, F, T, P>
where
    A: AdcChannel,
    F: InputPin,
    T: TemperatureDriver,
    P: OutputPin + StatefulOutputPin,
{
    pub fn new(sampler: SensorSampler<A, F, T>, actuators: ActuatorController<P>) -> Self {
        Self { sampler, actuators }
    }

    pub fn sampler(&self) -> &SensorSampler<A, F, T> {
        &self.sampler
    }

    pub fn actuators(&self) -> &ActuatorController<P> {
        &self.actuators
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A, F, T, P> SensorPort for HardwareAdapter<A, F, T, P>
where
    A: AdcChannel,
    F: InputPin,
    T: TemperatureDriver,
{
    fn sample(&mut self) -> Result<SensorReading> {
        self.sampler.sample()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A, F, T, P> ActuatorPort for HardwareAdapter<A, F, T, P>
where
    P: OutputPin + StatefulOutputPin,
{
    fn apply(&mut self, state: HazardState) -> ActuatorCommand {
        self.actuators.apply(state)
    }
}

// ── StatusIndicator implementation ────────────────────────────

impl<A, F, T, P> StatusIndicator for HardwareAdapter<A, F, T, P>
where
    P: OutputPin + StatefulOutputPin,
{
    fn toggle_status(&mut self) {
        self.actuators.toggle_status();
    }

    fn show_ready(&mut self) {
        self.actuators.show_ready();
    }

    fn chirp(&mut self, delay: &mut impl DelayNs) {
        self.actuators.chirp(delay);
    }
}
