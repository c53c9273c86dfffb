//! Sensor subsystem — individual drivers and the aggregating [`SensorSampler`].
//!
//! The sampler owns every sensor driver and produces one [`SensorReading`]
//! per control cycle.

pub mod flame;
pub mod gas;
pub mod temperature;

use embedded_hal::digital::InputPin;
use log::debug;

use crate::error::Result;
use flame::FlameSensor;
use gas::{AdcChannel, GasSensor};
use temperature::TemperatureDriver;

/// A point-in-time snapshot of every sensor, produced fresh each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    /// Gas concentration as a percentage of ADC full scale (0 – 100).
    pub gas_percent: f32,
    /// Flame sensor reports flame.
    pub flame_detected: bool,
    /// Temperature (°C).  `0.0` whenever `temperature_valid` is false.
    pub temperature_c: f32,
    /// The temperature driver produced a measurement this cycle.
    pub temperature_valid: bool,
}

impl SensorReading {
    /// Wire encoding of the flame flag.
    pub fn flame_code(&self) -> u8 {
        u8::from(self.flame_detected)
    }
}

/// Aggregates all sensor drivers and produces a unified reading.
pub struct SensorSampler<A, F, T> {
    gas: GasSensor<A>,
    flame: FlameSensor<F>,
    thermometer: T,
    temperature_failures: u32,
}

impl<A, F, T> SensorSampler<A, F, T>
where
    A: AdcChannel,
    F: InputPin,
    T: TemperatureDriver,
{
    /// Construct a new sampler.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established and the thermometer has
    /// already been probed).
    pub fn new(gas: GasSensor<A>, flame: FlameSensor<F>, thermometer: T) -> Self {
        Self {
            gas,
            flame,
            thermometer,
            temperature_failures: 0,
        }
    }

    /// Read every sensor once.
    ///
    /// A temperature failure is absorbed: the reading is returned with
    /// `temperature_valid = false`.  Gas and flame faults are returned to
    /// the caller.
    pub fn sample(&mut self) -> Result<SensorReading> {
        let gas = self.gas.read()?;
        let flame_detected = self.flame.read()?;

        let (temperature_c, temperature_valid) = match self.thermometer.measure() {
            Ok(c) => (c, true),
            Err(e) => {
                self.temperature_failures = self.temperature_failures.saturating_add(1);
                debug!(
                    "temperature read failed ({}), {} so far",
                    e, self.temperature_failures
                );
                (0.0, false)
            }
        };

        Ok(SensorReading {
            gas_percent: gas.percent,
            flame_detected,
            temperature_c,
            temperature_valid,
        })
    }

    /// Temperature reads that fell back to an invalid reading since boot.
    pub fn temperature_failures(&self) -> u32 {
        self.temperature_failures
    }
}
