//! Unified error types for the hot plate firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be passed through the safety supervisor and run logic
//! without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A run-control request was refused.
    Run(RunError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The persistence collaborator failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(e) => write!(f, "run: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults abort any active run and force both heaters off.  They are
/// accumulated in a bitfield by the safety supervisor so that simultaneous
/// faults on both zones can be tracked and individually cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Zone 1 thermistor open, shorted, or stuck.
    Zone1Sensor = 0b0000_0001,
    /// Zone 2 thermistor open, shorted, or stuck.
    Zone2Sensor = 0b0000_0010,
    /// A zone exceeded the hard temperature limit.
    OverTemperature = 0b0000_0100,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// The sensor fault for a given zone.
    pub const fn sensor(zone: crate::config::Zone) -> Self {
        match zone {
            crate::config::Zone::One => Self::Zone1Sensor,
            crate::config::Zone::Two => Self::Zone2Sensor,
        }
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone1Sensor => write!(f, "zone 1 thermistor failure"),
            Self::Zone2Sensor => write!(f, "zone 2 thermistor failure"),
            Self::OverTemperature => write!(f, "over temperature"),
        }
    }
}

// ---------------------------------------------------------------------------
// Run-control errors
// ---------------------------------------------------------------------------

/// Reasons a start request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    /// A run session is already active; stop it first.
    AlreadyRunning,
    /// At least one zone is faulted (carries the fault mask).
    Faulted(u8),
    /// Profile breakpoints are not `t1 <= t2 <= t3`.
    UnorderedProfile,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "a run is already active"),
            Self::Faulted(mask) => write!(f, "sensor fault active (flags=0b{mask:08b})"),
            Self::UnorderedProfile => write!(f, "profile breakpoints out of order"),
        }
    }
}

impl From<RunError> for Error {
    fn from(e: RunError) -> Self {
        Self::Run(e)
    }
}
