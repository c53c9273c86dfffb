//! Hazard evaluation.
//!
//! The evaluator runs **every cycle, right after sampling** and folds the
//! reading into a cause bitmask.  Any set bit means [`HazardState::Danger`].
//!
//! There is deliberately no latching and no history: the decision is a
//! pure function of the reading in hand, so one noisy sample near a
//! threshold can flip the state for exactly one cycle.
//!
//! Several causes can be active at once; the mask keeps all of them so the
//! event log can say *why* the node went to danger.

use core::fmt;

use crate::config::MonitorConfig;
use crate::sensors::SensorReading;

/// Binary safety classification for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HazardState {
    #[default]
    Safe,
    Danger,
}

impl HazardState {
    /// `0` for safe, `1` for danger.  This is the value uploaded as the
    /// alert field and compared by the upload scheduler.
    pub const fn alert_code(self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Danger => 1,
        }
    }

    pub const fn is_danger(self) -> bool {
        matches!(self, Self::Danger)
    }
}

impl fmt::Display for HazardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Danger => write!(f, "DANGER"),
        }
    }
}

/// Individual reasons a reading counts as dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HazardCause {
    GasLeak = 0x01,
    Flame = 0x02,
    OverTemperature = 0x04,
}

impl HazardCause {
    pub const ALL: [Self; 3] = [Self::GasLeak, Self::Flame, Self::OverTemperature];

    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HazardCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GasLeak => write!(f, "gas leak"),
            Self::Flame => write!(f, "flame"),
            Self::OverTemperature => write!(f, "over-temperature"),
        }
    }
}

/// Stateless threshold check over a [`SensorReading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardEvaluator {
    gas_threshold_percent: f32,
    temperature_threshold_c: f32,
}

impl HazardEvaluator {
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_thresholds(config.gas_threshold_percent, config.temperature_threshold_c)
    }

    pub const fn with_thresholds(gas_threshold_percent: f32, temperature_threshold_c: f32) -> Self {
        Self {
            gas_threshold_percent,
            temperature_threshold_c,
        }
    }

    /// Bitmask of every [`HazardCause`] present in `reading`.
    ///
    /// An invalid temperature never contributes, whatever its value.
    pub fn assess(&self, reading: &SensorReading) -> u8 {
        let mut causes = 0u8;
        if reading.gas_percent > self.gas_threshold_percent {
            causes |= HazardCause::GasLeak.mask();
        }
        if reading.flame_detected {
            causes |= HazardCause::Flame.mask();
        }
        if reading.temperature_valid && reading.temperature_c > self.temperature_threshold_c {
            causes |= HazardCause::OverTemperature.mask();
        }
        causes
    }

    /// Classify `reading`.
    pub fn evaluate(&self, reading: &SensorReading) -> HazardState {
        self.classify(reading).0
    }

    /// State and cause mask together; `Danger` iff the mask is non-zero.
    pub fn classify(&self, reading: &SensorReading) -> (HazardState, u8) {
        let causes = self.assess(reading);
        let state = if causes != 0 {
            HazardState::Danger
        } else {
            HazardState::Safe
        };
        (state, causes)
    }
}

/// Iterate the causes set in `mask`.
pub fn causes(mask: u8) -> impl Iterator<Item = HazardCause> {
    HazardCause::ALL
        .into_iter()
        .filter(move |c| mask & c.mask() != 0)
}
