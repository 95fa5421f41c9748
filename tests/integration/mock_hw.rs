//! Mock plate and event recorder for integration tests.
//!
//! The plate reports whatever temperatures and fault flags the test sets
//! and records every heater command, so tests can assert on the full duty
//! history without touching real ADC/PWM registers.

use hotplate::app::events::AppEvent;
use hotplate::app::ports::{ActuatorPort, EventSink, SensorPort};
use hotplate::app::service::Supervisor;
use hotplate::config::{TimingConfig, Zone};
use hotplate::params::ParamStore;
use hotplate::sensors::SensorSnapshot;
use hotplate::sensors::thermistor::ZoneReading;

// ── MockPlate ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockPlate {
    pub temps: [f32; 2],
    pub faulted: [bool; 2],
    /// Last duty per zone (percent).
    pub duty: [f32; 2],
    /// Every heater command, in order.
    pub commands: Vec<(Zone, f32)>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockPlate {
    pub fn at(celsius: f32) -> Self {
        Self {
            temps: [celsius; 2],
            ..Self::default()
        }
    }

    pub fn heaters_off(&self) -> bool {
        self.duty == [0.0; 2]
    }

    pub fn any_heating(&self) -> bool {
        self.duty.iter().any(|&d| d > 0.0)
    }
}

impl SensorPort for MockPlate {
    fn read_all(&mut self) -> SensorSnapshot {
        self.reads += 1;
        let zone = |i: usize| ZoneReading {
            counts: 512.0,
            celsius: self.temps[i],
            faulted: self.faulted[i],
        };
        SensorSnapshot {
            zones: [zone(0), zone(1)],
        }
    }
}

impl ActuatorPort for MockPlate {
    fn set_heater_duty(&mut self, zone: Zone, percent: f32) {
        self.duty[zone.index()] = percent;
        self.commands.push((zone, percent));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixture ───────────────────────────────────────────────────

/// Started supervisor with default parameters, a plate at `celsius` and
/// an empty event log.
#[allow(dead_code)]
pub fn started(celsius: f32) -> (Supervisor, MockPlate, RecordingSink) {
    let mut sup = Supervisor::new(ParamStore::default(), TimingConfig::default());
    let mut sink = RecordingSink::new();
    sup.start(&mut sink);
    sink.clear();
    (sup, MockPlate::at(celsius), sink)
}
