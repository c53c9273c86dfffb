//! IR flame sensor module (LM393 comparator output).
//!
//! The comparator pulls its output LOW while the photodiode sees flame,
//! so the line is active-low.

use embedded_hal::digital::InputPin;

use crate::error::SensorReadError;

pub struct FlameSensor<P> {
    pin: P,
}

impl<P: InputPin> FlameSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// `true` when the pin reads LOW.
    pub fn read(&mut self) -> Result<bool, SensorReadError> {
        self.pin.is_low().map_err(|_| SensorReadError::GpioReadFailed)
    }
}
