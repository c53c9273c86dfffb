//! Application core — pure domain logic behind port traits.
//!
//! This module contains the control loop of the hazard monitor:
//! sampling, hazard evaluation, actuation, and upload scheduling.
//! All interaction with hardware and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
