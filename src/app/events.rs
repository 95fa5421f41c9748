//! Outbound events and the read-only status snapshot.
//!
//! The [`Supervisor`](super::service::Supervisor) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port and publishes a
//! [`StatusSnapshot`] to the menu every tick.

use serde::{Deserialize, Serialize};

use crate::fsm::StateId;
use crate::params::ParamField;

/// Which kind of run a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Constant,
    Reflow,
}

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// The supervisor has started.
    Started,

    /// A run began. Carries the ramp origin temperature.
    RunStarted { mode: RunMode, initial_temp_c: f32 },

    /// The reflow profile moved to a new phase.
    PhaseChanged { from: StateId, to: StateId },

    /// The reflow profile reached cooling on schedule.
    RunCompleted { elapsed_secs: u32 },

    /// A fault stopped an active run (carries the fault mask).
    RunAborted { faults: u8 },

    /// A run was ended by the operator.
    RunStopped { mode: RunMode, elapsed_secs: u32 },

    /// One or more safety faults were raised (full mask).
    FaultDetected(u8),

    /// All safety faults have cleared.
    FaultCleared,

    /// A parameter was written.
    ParameterChanged { field: ParamField, value: f32 },

    /// Parameters were persisted.
    ConfigSaved,

    /// Parameters were restored from storage (`false` = defaults used).
    ConfigLoaded { from_storage: bool },
}

/// Read-only view handed to the display every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Latest reading per zone.
    pub live_temps_c: [f32; 2],
    /// Display temperatures, refreshed once per second while running.
    pub display_temps_c: [f32; 2],
    pub zone_faults: [bool; 2],
    /// Safety fault bitmask.
    pub faults: u8,
    pub mode: Option<RunMode>,
    pub phase: StateId,
    pub elapsed_secs: u32,
    pub setpoint_c: f32,
    /// Per-zone duty command (percent).
    pub duty_percent: [f32; 2],
    /// True once a fault has aborted the current run.
    pub aborted: bool,
    /// Field and working value while a parameter is being edited.
    pub editing: Option<(ParamField, f32)>,
}
