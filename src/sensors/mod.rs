//! Temperature sensing: thermistor conversion and the two-zone [`SensorHub`].
//!
//! The hub owns the ADC, the settling delay and one [`ThermistorChannel`]
//! per zone. Each reading averages a fixed number of raw samples taken with
//! a short blocking delay between them, then runs the fault check. The
//! delay is a bounded synchronous wait: a reading is never abandoned
//! half-way.

pub mod thermistor;

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::config::{ThermistorCalibration, TimingConfig, Zone};
use thermistor::{ThermistorChannel, ZoneReading};

/// Upper bound on samples per reading, which bounds the settling wait.
pub const MAX_SAMPLES: usize = 16;

/// Raw analog input for the thermistor dividers.
pub trait AnalogInput {
    /// One raw ADC conversion for the zone's divider.
    fn read_counts(&mut self, zone: Zone) -> u16;
}

/// Both zones' readings at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Indexed by [`Zone::index`].
    pub zones: [ZoneReading; 2],
}

impl SensorSnapshot {
    pub fn zone(&self, zone: Zone) -> ZoneReading {
        self.zones[zone.index()]
    }

    /// Mean of both zone temperatures.
    pub fn average_celsius(&self) -> f32 {
        (self.zones[0].celsius + self.zones[1].celsius) / 2.0
    }

    pub fn any_faulted(&self) -> bool {
        self.zones.iter().any(|z| z.faulted)
    }
}

/// Samples both zones through one ADC.
pub struct SensorHub<A: AnalogInput, D: DelayNs> {
    adc: A,
    delay: D,
    channels: [ThermistorChannel; 2],
    samples_per_reading: usize,
    settle_ms: u32,
}

impl<A: AnalogInput, D: DelayNs> SensorHub<A, D> {
    pub fn new(adc: A, delay: D, calibration: [ThermistorCalibration; 2], timing: &TimingConfig) -> Self {
        Self {
            adc,
            delay,
            channels: [
                ThermistorChannel::new(calibration[0], timing),
                ThermistorChannel::new(calibration[1], timing),
            ],
            samples_per_reading: timing.samples_per_reading.clamp(1, MAX_SAMPLES),
            settle_ms: timing.sample_settle_ms,
        }
    }

    /// Take an averaged reading of one zone and update its fault state.
    pub fn sample(&mut self, zone: Zone) -> ZoneReading {
        let mut sum = 0u32;
        for i in 0..self.samples_per_reading {
            if i > 0 {
                self.delay.delay_ms(self.settle_ms);
            }
            sum += u32::from(self.adc.read_counts(zone));
        }
        let average = sum as f32 / self.samples_per_reading as f32;

        let reading = self.channels[zone.index()].update(average);
        if reading.faulted {
            log::debug!(
                "{}: faulted reading {:.2}\u{00b0}C ({:.1} counts)",
                zone,
                reading.celsius,
                reading.counts
            );
        }
        reading
    }

    /// Sample both zones.
    pub fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            zones: [self.sample(Zone::One), self.sample(Zone::Two)],
        }
    }

    /// Last readings without touching the ADC.
    pub fn last(&self) -> SensorSnapshot {
        SensorSnapshot {
            zones: [self.channels[0].last(), self.channels[1].last()],
        }
    }
}
