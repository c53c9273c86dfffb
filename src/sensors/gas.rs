//! MQ-2 combustible gas sensor driver.
//!
//! Reads the analog output through an ADC channel and reports it as a
//! percentage of full scale.  There is no ppm calibration: the hazard
//! threshold is expressed directly in percent of the ADC range.

use crate::drivers::hw_init;
use crate::error::SensorReadError;

/// Full-scale ADC value the driver normalises against.
pub const FULL_SCALE: f32 = 65535.0;

/// An analog channel that reports 16-bit full-scale conversions.
pub trait AdcChannel {
    fn read_u16(&mut self) -> Result<u16, SensorReadError>;
}

/// ADC1 oneshot channel configured by [`hw_init`].
pub struct Adc1Channel {
    channel: u32,
}

impl Adc1Channel {
    pub const fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl AdcChannel for Adc1Channel {
    fn read_u16(&mut self) -> Result<u16, SensorReadError> {
        hw_init::adc1_read(self.channel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub raw: u16,
    pub percent: f32,
}

pub struct GasSensor<A> {
    adc: A,
}

impl<A: AdcChannel> GasSensor<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }

    pub fn read(&mut self) -> Result<GasReading, SensorReadError> {
        let raw = self.adc.read_u16()?;
        Ok(GasReading {
            raw,
            percent: raw_to_percent(raw),
        })
    }
}

/// `raw / 65535 * 100`, always within `[0, 100]`.
pub fn raw_to_percent(raw: u16) -> f32 {
    f32::from(raw) / FULL_SCALE * 100.0
}
