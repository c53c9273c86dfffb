//! `embedded-hal` pin wrapper over the raw [`hw_init`] GPIO helpers.
//!
//! Lets the sensor and actuator drivers stay generic over
//! `embedded_hal::digital` traits while the board code keeps its
//! single raw-sys-call initialisation path.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

use crate::drivers::hw_init;

/// A GPIO configured by [`hw_init::init_peripherals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin {
    num: i32,
}

impl GpioPin {
    pub const fn new(num: i32) -> Self {
        Self { num }
    }

    pub const fn num(&self) -> i32 {
        self.num
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.num))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.num))
    }
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.num, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.num, true);
        Ok(())
    }
}

impl StatefulOutputPin for GpioPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.num))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.num))
    }
}
