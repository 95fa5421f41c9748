//! Safety supervisor.
//!
//! Runs on every sensor reading, before the profile machine and the
//! controllers, and maintains a fault bitmask of [`SafetyFault`] bits.
//!
//! ## Fault lifecycle
//!
//! 1. A zone reports a faulted reading, or exceeds the hard temperature
//!    limit.
//! 2. The supervisor sets the corresponding bit.
//! 3. The process supervisor sees a non-zero mask during a run and latches
//!    an abort: heaters off, controllers manual.
//! 4. Each reading re-evaluates every bit. A bit clears as soon as the
//!    condition does; the run abort stays latched until the operator
//!    returns to idle.
//!
//! Several faults may be active at once; new runs are refused until the
//! mask is zero.

use crate::config::{TimingConfig, Zone};
use crate::error::SafetyFault;
use crate::sensors::SensorSnapshot;
use log::{error, info};

/// Safety supervisor.
pub struct SafetySupervisor {
    max_temp_c: f32,
    /// Current fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            max_temp_c: timing.max_temperature_c,
            faults: 0,
        }
    }

    /// Evaluate all conditions against a fresh snapshot.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, snap: &SensorSnapshot) -> u8 {
        for zone in Zone::ALL {
            self.eval_fault(SafetyFault::sensor(zone), snap.zone(zone).faulted);
        }

        // Only trust a temperature from a healthy thermistor.
        let over = Zone::ALL.iter().any(|&z| {
            let r = snap.zone(z);
            !r.faulted && r.celsius > self.max_temp_c
        });
        self.eval_fault(SafetyFault::OverTemperature, over);

        self.faults
    }

    pub fn faults(&self) -> u8 {
        self.faults
    }

    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
