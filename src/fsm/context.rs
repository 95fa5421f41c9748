//! Shared mutable context threaded through every profile handler.
//!
//! The supervisor writes `elapsed_secs` before each tick; handlers read the
//! profile snapshot and write `setpoint_c` and `heaters_enabled`.

use crate::config::ReflowProfile;

/// Blackboard for the profile state machine.
#[derive(Debug, Clone)]
pub struct ProfileContext {
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    /// Seconds since run start.
    pub elapsed_secs: f32,
    /// Average of both zones at run start; origin of the first ramp.
    pub initial_temp_c: f32,
    /// Profile captured at run start. Edits made during a run apply to the
    /// next run.
    pub profile: ReflowProfile,

    /// Setpoint derived for the current phase (°C).
    pub setpoint_c: f32,
    /// False in `Idle` and `Cooling`.
    pub heaters_enabled: bool,
}

impl ProfileContext {
    pub fn new(profile: ReflowProfile) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            elapsed_secs: 0.0,
            initial_temp_c: 0.0,
            profile,
            setpoint_c: 0.0,
            heaters_enabled: false,
        }
    }

    /// Reset run fields for a new reflow run.
    pub fn begin_run(&mut self, profile: ReflowProfile, initial_temp_c: f32) {
        self.profile = profile;
        self.initial_temp_c = initial_temp_c;
        self.elapsed_secs = 0.0;
        self.setpoint_c = initial_temp_c;
    }
}

/// Linear interpolation from `from` to `to` over `[start, end]` seconds.
///
/// A zero-length (or inverted) segment yields `to` immediately.
pub fn interpolate(from: f32, to: f32, start_secs: f32, end_secs: f32, elapsed_secs: f32) -> f32 {
    let span = end_secs - start_secs;
    if span <= 0.0 {
        return to;
    }
    let frac = ((elapsed_secs - start_secs) / span).clamp(0.0, 1.0);
    from + (to - from) * frac
}
