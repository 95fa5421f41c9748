//! Concrete phase handlers and table builder.
//!
//! ```text
//!  IDLE ──[start]──▶ RAMP ──[t1]──▶ SOAK ──[t2]──▶ REFLOW_RAMP
//!    ▲                                                  │
//!    │                                                [t3]
//!    │                                                  ▼
//!    └──[stop/ack]── COOLING ◀──[t3 + hold]──── REFLOW_HOLD
//!
//!  Any heating phase ──[fault abort]──▶ COOLING
//! ```

use super::context::{interpolate, ProfileContext};
use super::{StateDescriptor, StateId};
use log::info;

/// Build the static state table. Called once per machine.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Ramp
        StateDescriptor {
            id: StateId::Ramp,
            name: "Ramp",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: ramp_update,
        },
        // Index 2: Soak
        StateDescriptor {
            id: StateId::Soak,
            name: "Soak",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: soak_update,
        },
        // Index 3: ReflowRamp
        StateDescriptor {
            id: StateId::ReflowRamp,
            name: "ReflowRamp",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: reflow_ramp_update,
        },
        // Index 4: ReflowHold
        StateDescriptor {
            id: StateId::ReflowHold,
            name: "ReflowHold",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: reflow_hold_update,
        },
        // Index 5: Cooling
        StateDescriptor {
            id: StateId::Cooling,
            name: "Cooling",
            on_enter: Some(cooling_enter),
            on_exit: None,
            on_update: cooling_update,
        },
    ]
}

fn secs(v: u8) -> f32 {
    f32::from(v)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut ProfileContext) {
    ctx.setpoint_c = 0.0;
    ctx.heaters_enabled = false;
}

fn idle_update(_ctx: &mut ProfileContext) -> Option<StateId> {
    // Left only by an explicit start.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Heating phases
// ═══════════════════════════════════════════════════════════════════════════

fn heating_enter(ctx: &mut ProfileContext) {
    ctx.heaters_enabled = true;
}

fn ramp_update(ctx: &mut ProfileContext) -> Option<StateId> {
    let p = ctx.profile;
    if ctx.elapsed_secs >= secs(p.preheat_secs) {
        return Some(StateId::Soak);
    }
    ctx.setpoint_c = interpolate(
        ctx.initial_temp_c,
        f32::from(p.preheat_c),
        0.0,
        secs(p.preheat_secs),
        ctx.elapsed_secs,
    );
    None
}

fn soak_update(ctx: &mut ProfileContext) -> Option<StateId> {
    let p = ctx.profile;
    if ctx.elapsed_secs >= secs(p.soak_secs) {
        return Some(StateId::ReflowRamp);
    }
    ctx.setpoint_c = interpolate(
        f32::from(p.preheat_c),
        f32::from(p.soak_c),
        secs(p.preheat_secs),
        secs(p.soak_secs),
        ctx.elapsed_secs,
    );
    None
}

fn reflow_ramp_update(ctx: &mut ProfileContext) -> Option<StateId> {
    let p = ctx.profile;
    if ctx.elapsed_secs >= secs(p.peak_secs) {
        return Some(StateId::ReflowHold);
    }
    ctx.setpoint_c = interpolate(
        f32::from(p.soak_c),
        f32::from(p.peak_c),
        secs(p.soak_secs),
        secs(p.peak_secs),
        ctx.elapsed_secs,
    );
    None
}

fn reflow_hold_update(ctx: &mut ProfileContext) -> Option<StateId> {
    let p = ctx.profile;
    if ctx.elapsed_secs >= p.cooling_at_secs() as f32 {
        return Some(StateId::Cooling);
    }
    ctx.setpoint_c = f32::from(p.peak_c);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLING: terminal until stop or acknowledge
// ═══════════════════════════════════════════════════════════════════════════

fn cooling_enter(ctx: &mut ProfileContext) {
    ctx.setpoint_c = 0.0;
    ctx.heaters_enabled = false;
    info!("COOLING: heaters off after {:.0}s", ctx.elapsed_secs);
}

fn cooling_update(ctx: &mut ProfileContext) -> Option<StateId> {
    ctx.setpoint_c = 0.0;
    None
}
