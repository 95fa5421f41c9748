//! NTC thermistor conversion and per-zone fault detection.
//!
//! Each hot plate zone has an NTC thermistor (120 kOhm @ 25 C, B = 3950)
//! wired against a fixed 100 kOhm series resistor and read by the ADC.
//! Averaged counts are converted to resistance and then to temperature with
//! the Beta form of the Steinhart-Hart equation:
//!
//! ```text
//! R = Rs * (FS - counts) / counts
//! T = 1 / (ln(R / R0) / B + 1 / T0) - 273.15
//! ```
//!
//! ## Fault detection
//!
//! A zone is faulted when its reading is below the valid minimum (open
//! thermistor) or when the same value has been repeated `stuck_repeat_limit`
//! times in a row (frozen ADC or disconnected divider). The flag is
//! recomputed on every reading and is never latched here.

use serde::{Deserialize, Serialize};

use crate::config::{ThermistorCalibration, TimingConfig};

/// Reported for readings the divider cannot produce (0 or full-scale counts).
pub const ABSOLUTE_ZERO_C: f32 = -273.15;

/// One calibrated zone reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneReading {
    /// Averaged raw ADC counts.
    pub counts: f32,
    pub celsius: f32,
    /// True if this reading failed the range or stuck check.
    pub faulted: bool,
}

impl Default for ZoneReading {
    fn default() -> Self {
        Self {
            counts: 0.0,
            celsius: 0.0,
            faulted: false,
        }
    }
}

/// Convert averaged ADC counts to degrees Celsius.
pub fn counts_to_celsius(counts: f32, cal: &ThermistorCalibration) -> f32 {
    if counts <= 0.0 || counts >= cal.adc_full_scale {
        return ABSOLUTE_ZERO_C;
    }
    let r_ntc = cal.series_ohms * (cal.adc_full_scale - counts) / counts;
    let inv_t = (r_ntc / cal.nominal_ohms).ln() / cal.beta + 1.0 / (cal.nominal_c + 273.15);
    if !inv_t.is_finite() || inv_t <= 0.0 {
        return ABSOLUTE_ZERO_C;
    }
    (1.0 / inv_t) - 273.15
}

// ---------------------------------------------------------------------------
// Fault detector
// ---------------------------------------------------------------------------

/// Range and stuck-value check for one zone.
#[derive(Debug, Clone)]
pub struct FaultDetector {
    previous: Option<f32>,
    repeats: u8,
    repeat_limit: u8,
    min_valid_c: f32,
}

impl FaultDetector {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            previous: None,
            repeats: 0,
            repeat_limit: timing.stuck_repeat_limit,
            min_valid_c: timing.min_valid_temperature_c,
        }
    }

    /// Feed a new reading; returns whether the zone is faulted now.
    pub fn evaluate(&mut self, celsius: f32) -> bool {
        // Equality against the previous reading, not an overwrite of it.
        if self.previous == Some(celsius) {
            self.repeats = self.repeats.saturating_add(1);
        } else {
            self.repeats = 0;
        }
        self.previous = Some(celsius);

        !celsius.is_finite() || celsius < self.min_valid_c || self.repeats >= self.repeat_limit
    }

    /// Consecutive repeats of the current value.
    pub fn repeats(&self) -> u8 {
        self.repeats
    }
}

// ---------------------------------------------------------------------------
// Thermistor channel
// ---------------------------------------------------------------------------

/// Calibration plus fault history for one zone.
#[derive(Debug, Clone)]
pub struct ThermistorChannel {
    calibration: ThermistorCalibration,
    detector: FaultDetector,
    last: ZoneReading,
}

impl ThermistorChannel {
    pub fn new(calibration: ThermistorCalibration, timing: &TimingConfig) -> Self {
        Self {
            calibration,
            detector: FaultDetector::new(timing),
            last: ZoneReading::default(),
        }
    }

    /// Convert an averaged count and run the fault check.
    pub fn update(&mut self, counts: f32) -> ZoneReading {
        let celsius = counts_to_celsius(counts, &self.calibration);
        let faulted = self.detector.evaluate(celsius);
        self.last = ZoneReading {
            counts,
            celsius,
            faulted,
        };
        self.last
    }

    /// Last value produced by [`update`](Self::update).
    pub fn last(&self) -> ZoneReading {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cal() -> ThermistorCalibration {
        ThermistorCalibration::default()
    }

    fn detector() -> FaultDetector {
        FaultDetector::new(&TimingConfig::default())
    }

    #[test]
    fn nominal_resistance_reads_nominal_temperature() {
        let c = cal();
        // Counts at which R == R0: FS * Rs / (R0 + Rs)
        let counts = c.adc_full_scale * c.series_ohms / (c.nominal_ohms + c.series_ohms);
        let t = counts_to_celsius(counts, &c);
        assert!((t - 25.0).abs() < 0.01, "got {t}");
    }

    #[test]
    fn lower_resistance_reads_hotter() {
        let c = cal();
        let cold = counts_to_celsius(300.0, &c);
        let hot = counts_to_celsius(900.0, &c);
        assert!(hot > cold);
    }

    #[test]
    fn rail_counts_read_absolute_zero() {
        let c = cal();
        assert_eq!(counts_to_celsius(0.0, &c), ABSOLUTE_ZERO_C);
        assert_eq!(counts_to_celsius(1023.0, &c), ABSOLUTE_ZERO_C);
    }

    #[test]
    fn below_minimum_is_faulted_and_clears() {
        let mut d = detector();
        assert!(d.evaluate(-25.0));
        assert!(!d.evaluate(22.0));
    }

    #[test]
    fn exactly_minimum_is_not_faulted() {
        let mut d = detector();
        assert!(!d.evaluate(-20.0));
    }

    #[test]
    fn third_repeat_faults_and_change_clears() {
        let mut d = detector();
        assert!(!d.evaluate(60.0));
        assert!(!d.evaluate(60.0)); // 1st repeat
        assert!(!d.evaluate(60.0)); // 2nd repeat
        assert!(d.evaluate(60.0)); // 3rd repeat
        assert_eq!(d.repeats(), 3);
        assert!(!d.evaluate(60.5));
        assert_eq!(d.repeats(), 0);
    }

    /// A changing signal must never count as a repeat. Overwriting the
    /// stored value instead of comparing against it would flag every
    /// healthy sensor after three readings.
    #[test]
    fn changing_readings_never_count_as_repeats() {
        let mut d = detector();
        for i in 0..50 {
            assert!(!d.evaluate(25.0 + i as f32 * 0.25));
            assert_eq!(d.repeats(), 0);
        }
    }

    #[test]
    fn nan_is_faulted() {
        let mut d = detector();
        assert!(d.evaluate(f32::NAN));
    }

    #[test]
    fn channel_keeps_last_reading() {
        let mut ch = ThermistorChannel::new(cal(), &TimingConfig::default());
        let r = ch.update(512.0);
        assert_eq!(ch.last(), r);
        assert!(!r.faulted);
        assert!(r.celsius > 20.0 && r.celsius < 40.0);
    }
}
