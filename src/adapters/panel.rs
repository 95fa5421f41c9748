//! Front panel: the rotary encoder and its push-button plus a log-backed
//! status line, implementing [`MenuPort`].
//!
//! While idle the encoder scrolls a menu of run starts and editable
//! parameters. Once an edit begins, encoder steps go to the supervisor's
//! editor instead (see [`Supervisor::poll_input`]).
//!
//! | Gesture     | Menu           | Editing | Constant run  | Reflow run | Finished    |
//! |-------------|----------------|---------|---------------|------------|-------------|
//! | Rotate      | Move cursor    | Adjust  | –             | –          | –           |
//! | Short press | Select entry   | Commit  | Edit setpoint | –          | Acknowledge |
//! | Long press  | Save config    | Cancel  | Stop          | Stop       | Stop        |
//!
//! [`Supervisor::poll_input`]: crate::app::service::Supervisor::poll_input

use core::fmt;

use heapless::Deque;
use log::{info, warn};

use crate::app::commands::AppCommand;
use crate::app::events::{RunMode, StatusSnapshot};
use crate::app::ports::MenuPort;
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::fsm::StateId;
use crate::params::ParamField;

const QUEUE_DEPTH: usize = 4;

/// One line of the idle menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEntry {
    StartReflow,
    StartConstant,
    Edit(ParamField),
}

impl MenuEntry {
    /// Number of entries: the two run starts, then every parameter.
    pub const COUNT: usize = 2 + ParamField::ALL.len();

    /// Entry at a cursor position, wrapping in both directions.
    pub fn at(index: i32) -> Self {
        match index.rem_euclid(Self::COUNT as i32) as usize {
            0 => Self::StartReflow,
            1 => Self::StartConstant,
            i => Self::Edit(ParamField::ALL[i - 2]),
        }
    }

    /// Request issued when the entry is selected.
    pub fn command(self) -> AppCommand {
        match self {
            Self::StartReflow => AppCommand::StartReflow,
            Self::StartConstant => AppCommand::StartConstant,
            Self::Edit(field) => AppCommand::BeginEdit(field),
        }
    }
}

impl fmt::Display for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartReflow => f.write_str("start reflow"),
            Self::StartConstant => f.write_str("start constant"),
            Self::Edit(field) => write!(f, "edit {field}"),
        }
    }
}

pub struct ButtonPanel {
    button: ButtonDriver,
    queue: Deque<AppCommand, QUEUE_DEPTH>,
    status: Option<StatusSnapshot>,
    cursor: i32,
    last_logged: Option<(u32, StateId)>,
    last_edit: Option<(ParamField, f32)>,
}

impl ButtonPanel {
    pub fn new(button: ButtonDriver) -> Self {
        Self {
            button,
            queue: Deque::new(),
            status: None,
            cursor: 0,
            last_logged: None,
            last_edit: None,
        }
    }

    /// Entry under the cursor.
    pub fn selected(&self) -> MenuEntry {
        MenuEntry::at(self.cursor)
    }

    /// Move the menu cursor by encoder steps. Only the idle menu scrolls.
    pub fn navigate(&mut self, steps: i32) {
        if steps == 0 || !self.in_menu() {
            return;
        }
        self.cursor = self.cursor.wrapping_add(steps).rem_euclid(MenuEntry::COUNT as i32);
        info!("Menu: {}", self.selected());
    }

    /// Run the button gesture machine and queue the resulting request.
    pub fn update(&mut self, now_ms: u32, pressed: bool) {
        let Some(gesture) = self.button.tick(now_ms, pressed) else {
            return;
        };
        let Some(cmd) = self.command_for(gesture) else {
            return;
        };
        info!("Panel: {:?} -> {:?}", gesture, cmd);
        if self.queue.push_back(cmd).is_err() {
            warn!("Panel: command queue full, dropping {:?}", cmd);
        }
    }

    /// Request for a gesture given the last rendered status.
    pub fn command_for(&self, gesture: ButtonEvent) -> Option<AppCommand> {
        let mode = self.status.and_then(|s| s.mode);
        let editing = self.status.is_some_and(|s| s.editing.is_some());
        let finished = self.status.is_some_and(|s| {
            s.aborted || (s.mode == Some(RunMode::Reflow) && s.phase == StateId::Cooling)
        });

        match (gesture, mode) {
            (ButtonEvent::ShortPress, _) if editing => Some(AppCommand::CommitEdit),
            (ButtonEvent::LongPress, _) if editing => Some(AppCommand::CancelEdit),
            (ButtonEvent::ShortPress, None) => Some(self.selected().command()),
            (ButtonEvent::LongPress, None) => Some(AppCommand::SaveConfig),
            (ButtonEvent::ShortPress, Some(_)) if finished => Some(AppCommand::Acknowledge),
            (ButtonEvent::ShortPress, Some(RunMode::Constant)) => {
                Some(AppCommand::BeginEdit(ParamField::ConstantSetpoint))
            }
            (ButtonEvent::ShortPress, Some(RunMode::Reflow)) => None,
            (ButtonEvent::LongPress, Some(_)) => Some(AppCommand::Stop),
        }
    }

    fn in_menu(&self) -> bool {
        self.status.is_none_or(|s| s.mode.is_none() && s.editing.is_none())
    }
}

impl MenuPort for ButtonPanel {
    fn poll_command(&mut self) -> Option<AppCommand> {
        self.queue.pop_front()
    }

    fn render(&mut self, status: &StatusSnapshot) {
        self.status = Some(*status);
        if status.editing != self.last_edit {
            self.last_edit = status.editing;
            if let Some((field, value)) = status.editing {
                info!("Edit {}: {}", field, value);
            }
        }
        if status.mode.is_none() {
            self.last_logged = None;
            return;
        }
        let key = (status.elapsed_secs, status.phase);
        if self.last_logged == Some(key) {
            return;
        }
        self.last_logged = Some(key);
        info!(
            "{:>4}s {:<11} sp={:>5.1} T1={:>5.1} T2={:>5.1} duty={:>3.0}/{:>3.0}{}",
            status.elapsed_secs,
            status.phase,
            status.setpoint_c,
            status.display_temps_c[0],
            status.display_temps_c[1],
            status.duty_percent[0],
            status.duty_percent[1],
            if status.aborted { " ABORTED" } else { "" },
        );
    }
}
