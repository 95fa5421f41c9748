//! GPIO / peripheral pin assignments for the hot plate controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Heater elements (logic-level MOSFET per zone)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the zone 1 heater MOSFET gate.
pub const HEATER_1_PWM_GPIO: i32 = 1;
/// LEDC PWM output driving the zone 2 heater MOSFET gate.
pub const HEATER_2_PWM_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Thermistors (ADC1, 100 kΩ series divider)
// ---------------------------------------------------------------------------

/// Zone 1 thermistor divider. ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const THERMISTOR_1_ADC_GPIO: i32 = 4;
pub const THERMISTOR_1_ADC_CHANNEL: u32 = 3;
/// Zone 2 thermistor divider. ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const THERMISTOR_2_ADC_GPIO: i32 = 5;
pub const THERMISTOR_2_ADC_CHANNEL: u32 = 4;

/// Full-scale count of the 12-bit oneshot ADC.
pub const ADC_FULL_SCALE: f32 = 4095.0;

// ---------------------------------------------------------------------------
// Rotary encoder and push-button (active-low with pull-ups)
// ---------------------------------------------------------------------------

/// Encoder channel A. Interrupt on any edge.
pub const ENCODER_A_GPIO: i32 = 6;
/// Encoder channel B. Sampled inside the channel A interrupt.
pub const ENCODER_B_GPIO: i32 = 7;
/// Encoder push-button (select / confirm).
pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits). 10-bit gives 0 – 1023 duty levels.
pub const HEATER_PWM_RESOLUTION_BITS: u32 = 10;
/// LEDC base frequency for the heater MOSFETs.
pub const HEATER_PWM_FREQ_HZ: u32 = 1_000;
