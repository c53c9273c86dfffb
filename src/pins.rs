//! GPIO / peripheral pin assignments for the hazard monitor board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// MQ-2 combustible gas sensor — analog output via resistive divider.
/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const GAS_ADC_GPIO: i32 = 4;
/// ADC1 channel wired to [`GAS_ADC_GPIO`].
pub const GAS_ADC1_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Sensors — Digital
// ---------------------------------------------------------------------------

/// IR flame sensor module, digital output.  Active-low: LOW = flame seen.
pub const FLAME_GPIO: i32 = 16;

/// DHT22 / DHT11 single-wire data line (open-drain, external 10 kΩ pull-up).
pub const DHT_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Piezo buzzer driver.  Active-low: HIGH = silent.
pub const BUZZER_GPIO: i32 = 15;
/// Red alarm / status LED.
pub const LED_RED_GPIO: i32 = 14;
/// Green "all clear" LED.
pub const LED_GREEN_GPIO: i32 = 13;
/// Relay for the suppression water pump.  HIGH = pump running.
pub const PUMP_GPIO: i32 = 18;

/// Every push-pull output, in the order they are initialised.
pub const OUTPUT_GPIOS: [i32; 4] = [BUZZER_GPIO, LED_RED_GPIO, LED_GREEN_GPIO, PUMP_GPIO];
