//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Supervisor (domain)
//! ```
//!
//! Driven adapters (thermistors, heaters, event sinks, byte storage, menu)
//! implement these traits. The [`Supervisor`](super::service::Supervisor)
//! consumes them via generics, so the control core never touches hardware
//! directly.

use crate::config::Zone;
use crate::sensors::SensorSnapshot;

use super::commands::AppCommand;
use super::events::{AppEvent, StatusSnapshot};

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one averaged, fault-checked reading of both zones.
pub trait SensorPort {
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the two heater elements.
pub trait ActuatorPort {
    /// Set a zone's duty command in percent (0–100).
    fn set_heater_duty(&mut self, zone: Zone, percent: f32);

    /// Both heaters off.
    fn all_off(&mut self) {
        for zone in Zone::ALL {
            self.set_heater_duty(zone, 0.0);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (domain ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed durable storage over a fixed range.
///
/// Writes are bounded synchronous operations: a write either completes or
/// returns an error, and is never abandoned part-way by the caller.
pub trait StoragePort {
    /// Fill `buf` from `address` onward.
    fn read_bytes(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `address`.
    fn write_bytes(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Menu port (display + rotary input collaborator)
// ───────────────────────────────────────────────────────────────

/// The menu layer: produces requests and renders status.
pub trait MenuPort {
    /// Next pending request, if any.
    fn poll_command(&mut self) -> Option<AppCommand>;

    /// Draw the current status. Called once per control tick.
    fn render(&mut self, status: &StatusSnapshot);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from parameter validation and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration in storage (first boot).
    NotFound,
    /// Stored configuration failed its integrity check.
    Corrupted,
    /// A field failed range validation. Names the field.
    ValidationFailed(&'static str),
    /// The storage backend failed underneath.
    Storage(StorageError),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address range outside the device.
    OutOfRange,
    /// Generic I/O error.
    IoError,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "address out of range"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
