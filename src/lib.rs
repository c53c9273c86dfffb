//! Hazard monitor firmware library.
//!
//! Exposes the control-loop logic and its adapters for integration testing
//! and for the firmware binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod diagnostics;
pub mod error;
pub mod pins;
pub mod safety;
pub mod scheduler;
pub mod telemetry;

// Board-facing modules; their ESP-IDF paths are cfg-gated inside and fall
// back to host simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;
