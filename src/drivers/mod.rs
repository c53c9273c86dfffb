//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod actuators;
pub mod gpio;
pub mod hw_init;
pub mod watchdog;
