//! PID loop controller for one heater zone
//!
//! Thin adapter over the [`pid`] crate that gives every zone the same
//! interface: configure gains, switch between manual and automatic, and
//! compute a duty command from the current temperature and setpoint.
//!
//! The underlying controller runs at a fixed sample period. Calling
//! [`LoopController::compute`] more often returns the previous output until
//! the period has elapsed, so the caller's loop rate does not change the
//! control behaviour.

use pid::Pid;
use serde::{Deserialize, Serialize};

use crate::config::PidGains;

/// Output ceiling (percent duty).
pub const MAX_DUTY_PERCENT: f32 = 100.0;

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Output forced to zero, integration suspended.
    Manual,
    /// Closed loop.
    Automatic,
}

/// PID controller for heater duty.
pub struct LoopController {
    pid: Pid<f32>,
    gains: PidGains,
    mode: ControlMode,
    sample_ms: u32,
    last_compute_ms: Option<u64>,
    output: f32,
}

impl LoopController {
    /// New controller in manual mode.
    pub fn new(gains: PidGains, sample_ms: u32) -> Self {
        let sample_ms = sample_ms.max(1);
        Self {
            pid: build_pid(gains, sample_ms),
            gains,
            mode: ControlMode::Manual,
            sample_ms,
            last_compute_ms: None,
            output: 0.0,
        }
    }

    /// Update gains without disturbing accumulated state.
    pub fn configure(&mut self, gains: PidGains) {
        let ts = sample_secs(self.sample_ms);
        self.gains = gains;
        self.pid.kp = gains.kp;
        self.pid.ki = gains.ki * ts;
        self.pid.kd = gains.kd / ts;
    }

    /// Switch mode. Entering automatic starts from a fresh controller;
    /// entering manual zeroes the output and the integral.
    pub fn set_mode(&mut self, mode: ControlMode) {
        if mode == self.mode {
            return;
        }
        match mode {
            ControlMode::Automatic => {
                self.pid = build_pid(self.gains, self.sample_ms);
                self.last_compute_ms = None;
            }
            ControlMode::Manual => {
                self.pid.reset_integral_term();
                self.output = 0.0;
            }
        }
        self.mode = mode;
    }

    /// Duty command (percent, 0–100) for the given measurement and setpoint.
    pub fn compute(&mut self, measurement_c: f32, setpoint_c: f32, now_ms: u64) -> f32 {
        if self.mode == ControlMode::Manual {
            return 0.0;
        }
        if let Some(last) = self.last_compute_ms {
            if now_ms.saturating_sub(last) < u64::from(self.sample_ms) {
                return self.output;
            }
        }

        self.pid.setpoint(setpoint_c);
        let out = self.pid.next_control_output(measurement_c);
        self.output = out.output.clamp(0.0, MAX_DUTY_PERCENT);
        self.last_compute_ms = Some(now_ms);
        self.output
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Last computed duty (0 in manual).
    pub fn output(&self) -> f32 {
        self.output
    }
}

fn sample_secs(sample_ms: u32) -> f32 {
    sample_ms as f32 / 1000.0
}

/// Per-sample gains: `Ki * Ts` and `Kd / Ts`.
fn build_pid(gains: PidGains, sample_ms: u32) -> Pid<f32> {
    let ts = sample_secs(sample_ms);
    let mut pid = Pid::new(0.0, MAX_DUTY_PERCENT);
    pid.p(gains.kp, MAX_DUTY_PERCENT)
        .i(gains.ki * ts, MAX_DUTY_PERCENT)
        .d(gains.kd / ts, MAX_DUTY_PERCENT);
    pid
}
