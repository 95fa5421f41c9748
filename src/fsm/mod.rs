//! Function-pointer finite state machine for the reflow profile.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌─────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId     │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├─────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle        │ fn(ctx)   │          │ fn(ctx)->Option<> │  │
//! │  │ Ramp        │ fn(ctx)   │          │ fn(ctx)->Option<> │  │
//! │  │ Soak        │ fn(ctx)   │          │ fn(ctx)->Option<> │  │
//! │  │ ReflowRamp  │ fn(ctx)   │          │ fn(ctx)->Option<> │  │
//! │  │ ReflowHold  │ fn(ctx)   │          │ fn(ctx)->Option<> │  │
//! │  │ Cooling     │ fn(ctx)   │          │ fn(ctx)->Option<> │  │
//! │  └─────────────┴───────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the current state. The
//! handler first checks whether elapsed time has passed its phase boundary
//! and returns `Some(next)` if so; otherwise it writes the interpolated
//! setpoint into the context. A tick keeps transitioning until a state
//! settles, so a zero-length phase is passed through within the same tick.

pub mod context;
pub mod states;

use context::ProfileContext;
use log::info;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Profile phases.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Ramp = 1,
    Soak = 2,
    ReflowRamp = 3,
    ReflowHold = 4,
    Cooling = 5,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `StateId`. Out-of-range falls back to
    /// `Cooling` (heaters off) in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Ramp,
            2 => Self::Soak,
            3 => Self::ReflowRamp,
            4 => Self::ReflowHold,
            5 => Self::Cooling,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Cooling
            }
        }
    }

    /// True for the phases that command heat.
    pub fn is_heating(self) -> bool {
        matches!(
            self,
            Self::Ramp | Self::Soak | Self::ReflowRamp | Self::ReflowHold
        )
    }
}

impl core::fmt::Display for StateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Ramp => "ramp",
            Self::Soak => "soak",
            Self::ReflowRamp => "reflow ramp",
            Self::ReflowHold => "reflow hold",
            Self::Cooling => "cooling",
        };
        f.pad(s)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut ProfileContext);

/// Per-tick update. Returns `Some(next)` to transition, `None` to stay.
pub type StateUpdateFn = fn(&mut ProfileContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single phase.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The profile state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Machine built from the standard table, starting in `Idle`.
    pub fn profile() -> Self {
        Self::new(states::build_state_table(), StateId::Idle)
    }

    /// Run the initial `on_enter`. Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut ProfileContext) {
        info!("profile FSM starting in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick using `ctx.elapsed_secs`.
    ///
    /// Transitions are followed until a state's update returns `None`,
    /// bounded by the number of states.
    pub fn tick(&mut self, ctx: &mut ProfileContext) {
        self.tick_count += 1;
        ctx.total_ticks = self.tick_count;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;

        for _ in 0..StateId::COUNT {
            match (self.table[self.current].on_update)(ctx) {
                Some(next) if next as usize != self.current => self.transition(next, ctx),
                _ => break,
            }
        }
    }

    /// Immediate transition (run start, abort, stop).
    pub fn force_transition(&mut self, next: StateId, ctx: &mut ProfileContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut ProfileContext) {
        let next_idx = next_id as usize;

        info!(
            "profile: {} -> {} at {:.0}s",
            self.table[self.current].name, self.table[next_idx].name, ctx.elapsed_secs
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
