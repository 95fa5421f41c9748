//! Rotary selection input and the parameter editor.
//!
//! The encoder interrupt adds signed steps to a [`SharedDelta`]; the control
//! loop takes the accumulated value inside a critical section, so an edge
//! arriving between the read and the reset is never lost.
//!
//! ```text
//!  encoder ISR ──add()──▶ SharedDelta ──take()──▶ ParameterEditor ──commit()──▶ ParamStore
//! ```

use core::cell::Cell;

use critical_section::Mutex;
use log::debug;

use crate::app::ports::ConfigError;
use crate::params::{FieldKind, ParamField, ParamStore};

// ---------------------------------------------------------------------------
// Shared delta (ISR producer, main-loop consumer)
// ---------------------------------------------------------------------------

/// Signed step counter shared with the encoder interrupt.
pub struct SharedDelta {
    steps: Mutex<Cell<i32>>,
}

impl SharedDelta {
    pub const fn new() -> Self {
        Self {
            steps: Mutex::new(Cell::new(0)),
        }
    }

    /// Add steps. Safe to call from interrupt context.
    pub fn add(&self, steps: i32) {
        critical_section::with(|cs| {
            let cell = self.steps.borrow(cs);
            cell.set(cell.get().saturating_add(steps));
        });
    }

    /// Copy the accumulated steps and reset to zero in one critical section.
    pub fn take(&self) -> i32 {
        critical_section::with(|cs| self.steps.borrow(cs).replace(0))
    }

    /// Current value without resetting.
    pub fn peek(&self) -> i32 {
        critical_section::with(|cs| self.steps.borrow(cs).get())
    }
}

impl Default for SharedDelta {
    fn default() -> Self {
        Self::new()
    }
}

/// Delta written by the encoder ISR on the device.
pub static SELECTION_DELTA: SharedDelta = SharedDelta::new();

// ---------------------------------------------------------------------------
// Parameter editor
// ---------------------------------------------------------------------------

/// Working copy of one parameter while the operator turns the knob.
#[derive(Debug, Clone, Default)]
pub struct ParameterEditor {
    field: Option<ParamField>,
    base: f32,
    steps: i32,
}

impl ParameterEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `field` from its stored value.
    pub fn begin(&mut self, field: ParamField, store: &ParamStore) {
        self.field = Some(field);
        self.base = store.get(field);
        self.steps = 0;
        debug!("editor: begin {} at {}", field, self.base);
    }

    /// Accumulate encoder steps. Ignored when nothing is being edited.
    pub fn apply(&mut self, steps: i32) {
        if self.field.is_some() {
            self.steps = self.steps.saturating_add(steps);
        }
    }

    pub fn field(&self) -> Option<ParamField> {
        self.field
    }

    /// Stored value plus accumulated steps, clamped to the field range.
    pub fn working_value(&self) -> Option<f32> {
        let field = self.field?;
        let (lo, hi) = field.range();
        let raw = self.base + self.steps as f32 * field.step();
        let v = match field.kind() {
            FieldKind::Gain => (raw * 100.0).round() / 100.0,
            FieldKind::Temperature | FieldKind::Duration => raw.round(),
        };
        Some(v.clamp(lo, hi))
    }

    /// Write the working value through the store and end the edit.
    pub fn commit(&mut self, store: &mut ParamStore) -> Result<Option<(ParamField, f32)>, ConfigError> {
        let (Some(field), Some(value)) = (self.field, self.working_value()) else {
            return Ok(None);
        };
        store.set(field, value)?;
        self.cancel();
        Ok(Some((field, value)))
    }

    /// Drop the working value.
    pub fn cancel(&mut self) {
        self.field = None;
        self.base = 0.0;
        self.steps = 0;
    }
}
