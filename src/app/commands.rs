//! Inbound requests to the process supervisor.
//!
//! These come from the menu collaborator (run control and parameter
//! editing) and are interpreted by
//! [`Supervisor::handle_command`](super::service::Supervisor::handle_command).

use serde::{Deserialize, Serialize};

use crate::params::ParamField;

/// Requests the menu layer can send into the control core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AppCommand {
    /// Hold both zones at the stored constant setpoint.
    StartConstant,

    /// Run the stored reflow profile from the current plate temperature.
    StartReflow,

    /// End any run and return to idle.
    Stop,

    /// Confirm a completed or aborted run and return to idle.
    Acknowledge,

    /// Begin editing a parameter with the rotary input.
    BeginEdit(ParamField),

    /// Write the working value through the parameter store.
    CommitEdit,

    /// Drop the working value.
    CancelEdit,

    /// Write a value directly (validated by the store).
    SetParameter(ParamField, f32),

    /// Persist the current parameters.
    SaveConfig,
}
