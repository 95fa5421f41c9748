//! System configuration parameters
//!
//! All tunable parameters for the hot plate: the reflow profile, per-zone
//! PID gains and the constant-temperature setpoint (together the
//! [`ParameterSet`], persisted by the parameter store), plus the fixed
//! timing and calibration constants the control loop runs with.

use serde::{Deserialize, Serialize};

/// One of the two independently controlled heater/thermistor pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    One,
    Two,
}

impl Zone {
    pub const ALL: [Zone; 2] = [Zone::One, Zone::Two];

    /// Array index for per-zone storage.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl core::fmt::Display for Zone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::One => write!(f, "zone 1"),
            Self::Two => write!(f, "zone 2"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reflow profile
// ---------------------------------------------------------------------------

/// Time/temperature breakpoints of the reflow curve.
///
/// Durations are cumulative seconds since run start: `t1` ends the ramp,
/// `t2` ends the soak, `t3` ends the reflow ramp, and the peak is held for
/// `hold_secs` after `t3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowProfile {
    /// Preheat target (°C).
    pub preheat_c: u8,
    /// End of ramp (s).
    pub preheat_secs: u8,
    /// Soak target (°C).
    pub soak_c: u8,
    /// End of soak (s).
    pub soak_secs: u8,
    /// Reflow peak (°C).
    pub peak_c: u8,
    /// End of reflow ramp (s).
    pub peak_secs: u8,
    /// Time held at peak after `peak_secs` (s).
    pub hold_secs: u8,
}

impl ReflowProfile {
    /// Elapsed second at which the hold ends and cooling begins.
    pub fn cooling_at_secs(&self) -> u32 {
        u32::from(self.peak_secs) + u32::from(self.hold_secs)
    }

    /// True when `t1 <= t2 <= t3`.
    pub fn breakpoints_ordered(&self) -> bool {
        self.preheat_secs <= self.soak_secs && self.soak_secs <= self.peak_secs
    }
}

impl Default for ReflowProfile {
    /// MG Chemicals 4902P (Sn42Bi57Ag1) low-temperature paste.
    fn default() -> Self {
        Self {
            preheat_c: 115,
            preheat_secs: 100,
            soak_c: 145,
            soak_secs: 155,
            peak_c: 185,
            peak_secs: 180,
            hold_secs: 35,
        }
    }
}

// ---------------------------------------------------------------------------
// PID gains
// ---------------------------------------------------------------------------

/// Proportional / integral / derivative gains for one zone.
///
/// `ki` is per second and `kd` is in seconds; the loop controller rescales
/// them to its fixed sample period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 3.30,
            ki: 0.02,
            kd: 3.45,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration snapshot
// ---------------------------------------------------------------------------

/// Everything the operator can tune and persist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub profile: ReflowProfile,
    /// Indexed by [`Zone::index`].
    pub gains: [PidGains; 2],
    /// Constant-temperature mode setpoint (°C).
    pub constant_setpoint_c: u8,
}

impl ParameterSet {
    pub fn gains(&self, zone: Zone) -> PidGains {
        self.gains[zone.index()]
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            profile: ReflowProfile::default(),
            gains: [PidGains::default(); 2],
            constant_setpoint_c: 35,
        }
    }
}

// ---------------------------------------------------------------------------
// Thermistor calibration
// ---------------------------------------------------------------------------

/// Beta-model NTC calibration for one zone's divider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermistorCalibration {
    /// Thermistor resistance at `nominal_c` (Ω).
    pub nominal_ohms: f32,
    /// Temperature of the nominal resistance (°C).
    pub nominal_c: f32,
    /// Beta coefficient (K).
    pub beta: f32,
    /// Fixed divider resistor (Ω).
    pub series_ohms: f32,
    /// ADC count at full scale.
    pub adc_full_scale: f32,
}

impl Default for ThermistorCalibration {
    fn default() -> Self {
        Self {
            nominal_ohms: 120_000.0,
            nominal_c: 25.0,
            beta: 3950.0,
            series_ohms: 100_000.0,
            adc_full_scale: 1023.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Timing and safety limits
// ---------------------------------------------------------------------------

/// Fixed cadence and limit constants for the control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// PID recomputation period (milliseconds).
    pub pid_sample_ms: u32,
    /// Sensor poll period while idle (milliseconds).
    pub idle_sample_ms: u32,
    /// Display temperature refresh period while running (milliseconds).
    pub display_refresh_ms: u32,
    /// Raw ADC samples averaged per reading.
    pub samples_per_reading: usize,
    /// Settling delay between raw samples (milliseconds).
    pub sample_settle_ms: u32,
    /// Below this a thermistor is considered open/failed (°C).
    pub min_valid_temperature_c: f32,
    /// Identical consecutive readings before a sensor is considered stuck.
    pub stuck_repeat_limit: u8,
    /// Hard over-temperature cutoff for either zone (°C).
    pub max_temperature_c: f32,
    /// Main loop pacing on the device (milliseconds).
    pub control_loop_interval_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pid_sample_ms: 200,
            idle_sample_ms: 10_000,
            display_refresh_ms: 1000,
            samples_per_reading: 5,
            sample_settle_ms: 5,
            min_valid_temperature_c: -20.0,
            stuck_repeat_limit: 3,
            max_temperature_c: 260.0,
            control_loop_interval_ms: 50,
        }
    }
}
