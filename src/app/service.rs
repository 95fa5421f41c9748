//! Process supervisor: the hexagonal core.
//!
//! [`Supervisor`] owns the profile machine, both loop controllers, the
//! safety supervisor and the parameter store. All I/O flows through port
//! traits passed in at call sites, so the whole control loop runs against
//! mocks on the host.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          Supervisor           │
//! ActuatorPort ◀──│  Safety · Profile FSM · PID×2 │ ──▶ StatusSnapshot
//!                 └──────────────────────────────┘
//!                         ▲            │
//!                 AppCommand       StoragePort
//! ```
//!
//! ## Tick
//!
//! 1. Sample both zones: every tick while running, every
//!    `idle_sample_ms` while idle (and on the first tick).
//! 2. Evaluate safety. A fault during a run latches an abort.
//! 3. Idle: controllers manual, heaters off.
//! 4. Running: refresh the display temperatures once per second, derive
//!    the setpoint (constant value or profile phase) and drive both
//!    controllers toward it.

use log::{debug, info, warn};

use crate::config::{TimingConfig, Zone};
use crate::control::pid::{ControlMode, LoopController};
use crate::error::{Error, RunError};
use crate::fsm::context::ProfileContext;
use crate::fsm::{Fsm, StateId};
use crate::input::{ParameterEditor, SharedDelta};
use crate::params::{FieldKind, ParamField, ParamStore};
use crate::safety::SafetySupervisor;
use crate::sensors::SensorSnapshot;

use super::commands::AppCommand;
use super::events::{AppEvent, RunMode, StatusSnapshot};
use super::ports::{ActuatorPort, ConfigError, EventSink, SensorPort, StorageError, StoragePort};

// ───────────────────────────────────────────────────────────────
// Run session
// ───────────────────────────────────────────────────────────────

/// The single active run.
#[derive(Debug, Clone, Copy)]
struct RunSession {
    mode: RunMode,
    start_ms: u64,
    elapsed_secs: u32,
    initial_temp_c: f32,
    /// Fault mask that aborted the run.
    aborted: Option<u8>,
    /// Reflow reached cooling on schedule.
    completed: bool,
}

impl RunSession {
    fn finished(&self) -> bool {
        self.completed || self.aborted.is_some()
    }
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

pub struct Supervisor {
    timing: TimingConfig,
    store: ParamStore,
    editor: ParameterEditor,
    safety: SafetySupervisor,
    fsm: Fsm,
    profile: ProfileContext,
    controllers: [LoopController; 2],
    session: Option<RunSession>,

    readings: SensorSnapshot,
    display_temps: [f32; 2],
    duty: [f32; 2],
    setpoint_c: f32,

    now_ms: u64,
    last_sample_ms: Option<u64>,
    last_display_ms: u64,
    save_requested: bool,
}

impl Supervisor {
    /// Construct from a parameter store and timing constants.
    ///
    /// Does **not** start the profile machine; call [`start`](Self::start).
    pub fn new(store: ParamStore, timing: TimingConfig) -> Self {
        let controllers = [
            LoopController::new(store.gains(Zone::One), timing.pid_sample_ms),
            LoopController::new(store.gains(Zone::Two), timing.pid_sample_ms),
        ];
        let profile = ProfileContext::new(store.params().profile);
        Self {
            safety: SafetySupervisor::new(&timing),
            timing,
            store,
            editor: ParameterEditor::new(),
            fsm: Fsm::profile(),
            profile,
            controllers,
            session: None,
            readings: SensorSnapshot::default(),
            display_temps: [0.0; 2],
            duty: [0.0; 2],
            setpoint_c: 0.0,
            now_ms: 0,
            last_sample_ms: None,
            last_display_ms: 0,
            save_requested: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.profile);
        sink.emit(&AppEvent::Started);
        info!("Supervisor started, idle");
    }

    /// Restore parameters from storage, falling back to defaults.
    pub fn load_config(
        &mut self,
        storage: &impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        let result = self.store.load(storage);
        self.reconfigure_controllers();
        sink.emit(&AppEvent::ConfigLoaded {
            from_storage: result.is_ok(),
        });
        result
    }

    /// Persist parameters if a save was requested.
    /// Returns `true` if a write happened.
    pub fn flush_config(
        &mut self,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<bool, StorageError> {
        if !self.save_requested {
            return Ok(false);
        }
        self.store.save(storage)?;
        self.save_requested = false;
        sink.emit(&AppEvent::ConfigSaved);
        Ok(true)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle at host time `now_ms`.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`ActuatorPort`].
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        self.now_ms = now_ms;

        // 1–2. Sample and evaluate safety
        if self.sample_due() {
            self.sample(hw, sink);
            if self.session.is_none() {
                self.display_temps = self.live_temps();
            }
        }

        let Some(mut session) = self.session else {
            // 3. Idle
            self.idle_outputs(hw);
            return;
        };

        // 4. Running
        let faults = self.safety.faults();
        if faults != 0 && session.aborted.is_none() {
            self.abort(&mut session, faults, sink);
        }

        let cooling = session.mode == RunMode::Reflow && self.fsm.current_state() == StateId::Cooling;
        if session.aborted.is_none() && !cooling {
            session.elapsed_secs = (now_ms.saturating_sub(session.start_ms) / 1000) as u32;
        }

        if now_ms.saturating_sub(self.last_display_ms) >= u64::from(self.timing.display_refresh_ms) {
            self.display_temps = self.live_temps();
            self.last_display_ms = now_ms;
        }

        let (setpoint, heating) = match (session.aborted, session.mode) {
            (Some(_), _) => (0.0, false),
            (None, RunMode::Constant) => (f32::from(self.store.params().constant_setpoint_c), true),
            (None, RunMode::Reflow) => self.advance_profile(&mut session, sink),
        };
        self.setpoint_c = setpoint;
        self.session = Some(session);
        self.drive(heating, hw);
    }

    /// Fold encoder steps into the active edit.
    ///
    /// Returns the steps for menu navigation when no edit is active.
    pub fn poll_input(&mut self, delta: &SharedDelta) -> i32 {
        let steps = delta.take();
        if self.editor.field().is_some() {
            self.editor.apply(steps);
            0
        } else {
            steps
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a request from the menu.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        self.now_ms = now_ms;
        match cmd {
            AppCommand::StartConstant => self.start_run(RunMode::Constant, hw, sink)?,
            AppCommand::StartReflow => self.start_run(RunMode::Reflow, hw, sink)?,
            AppCommand::Stop => {
                if let Some(s) = self.session {
                    sink.emit(&AppEvent::RunStopped {
                        mode: s.mode,
                        elapsed_secs: s.elapsed_secs,
                    });
                    info!("run stopped by operator after {}s", s.elapsed_secs);
                    self.end_run(hw, sink);
                }
            }
            AppCommand::Acknowledge => match self.session {
                Some(s) if s.finished() => {
                    info!("run acknowledged");
                    self.end_run(hw, sink);
                }
                _ => debug!("acknowledge ignored: nothing to confirm"),
            },
            AppCommand::BeginEdit(field) => self.editor.begin(field, &self.store),
            AppCommand::CommitEdit => {
                if let Some((field, value)) = self.editor.commit(&mut self.store)? {
                    self.parameter_changed(field, value, sink);
                }
            }
            AppCommand::CancelEdit => self.editor.cancel(),
            AppCommand::SetParameter(field, value) => {
                self.store.set(field, value)?;
                self.parameter_changed(field, value, sink);
            }
            AppCommand::SaveConfig => {
                self.save_requested = true;
                info!("config save requested");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        let session = self.session;
        StatusSnapshot {
            live_temps_c: self.live_temps(),
            display_temps_c: self.display_temps,
            zone_faults: [
                self.readings.zone(Zone::One).faulted,
                self.readings.zone(Zone::Two).faulted,
            ],
            faults: self.safety.faults(),
            mode: session.map(|s| s.mode),
            phase: self.fsm.current_state(),
            elapsed_secs: session.map_or(0, |s| s.elapsed_secs),
            setpoint_c: self.setpoint_c,
            duty_percent: self.duty,
            aborted: session.is_some_and(|s| s.aborted.is_some()),
            editing: self.editor.field().zip(self.editor.working_value()),
        }
    }

    /// Current profile phase (`Idle` outside reflow runs).
    pub fn phase(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn run_mode(&self) -> Option<RunMode> {
        self.session.map(|s| s.mode)
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn setpoint_c(&self) -> f32 {
        self.setpoint_c
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.session.map_or(0, |s| s.elapsed_secs)
    }

    /// Ramp origin captured at run start.
    pub fn initial_temp_c(&self) -> Option<f32> {
        self.session.map(|s| s.initial_temp_c)
    }

    pub fn controller_mode(&self, zone: Zone) -> ControlMode {
        self.controllers[zone.index()].mode()
    }

    pub fn duty(&self, zone: Zone) -> f32 {
        self.duty[zone.index()]
    }

    pub fn fault_flags(&self) -> u8 {
        self.safety.faults()
    }

    pub fn params(&self) -> &ParamStore {
        &self.store
    }

    pub fn save_pending(&self) -> bool {
        self.save_requested
    }

    // ── Internal ──────────────────────────────────────────────

    fn sample_due(&self) -> bool {
        if self.session.is_some() {
            return true;
        }
        match self.last_sample_ms {
            None => true,
            Some(last) => self.now_ms.saturating_sub(last) >= u64::from(self.timing.idle_sample_ms),
        }
    }

    fn sample(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        self.readings = hw.read_all();
        self.last_sample_ms = Some(self.now_ms);

        let before = self.safety.faults();
        let after = self.safety.evaluate(&self.readings);
        if after & !before != 0 {
            sink.emit(&AppEvent::FaultDetected(after));
        } else if before != 0 && after == 0 {
            sink.emit(&AppEvent::FaultCleared);
        }
    }

    fn live_temps(&self) -> [f32; 2] {
        [
            self.readings.zone(Zone::One).celsius,
            self.readings.zone(Zone::Two).celsius,
        ]
    }

    fn start_run(
        &mut self,
        mode: RunMode,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Result<(), RunError> {
        if self.session.is_some() {
            warn!("start refused: run already active");
            return Err(RunError::AlreadyRunning);
        }

        // Fresh reading for the fault gate and the ramp origin.
        self.sample(hw, sink);
        let faults = self.safety.faults();
        if faults != 0 {
            warn!("start refused: faults=0b{:08b}", faults);
            return Err(RunError::Faulted(faults));
        }

        let profile = self.store.params().profile;
        if mode == RunMode::Reflow && !profile.breakpoints_ordered() {
            warn!("start refused: profile breakpoints out of order");
            return Err(RunError::UnorderedProfile);
        }

        let initial_temp_c = self.readings.average_celsius();
        self.session = Some(RunSession {
            mode,
            start_ms: self.now_ms,
            elapsed_secs: 0,
            initial_temp_c,
            aborted: None,
            completed: false,
        });
        self.display_temps = self.live_temps();
        self.last_display_ms = self.now_ms;
        self.reconfigure_controllers();

        sink.emit(&AppEvent::RunStarted {
            mode,
            initial_temp_c,
        });
        info!("{:?} run started from {:.1}\u{00b0}C", mode, initial_temp_c);

        if mode == RunMode::Reflow {
            self.profile.begin_run(profile, initial_temp_c);
            self.transition(StateId::Ramp, sink);
        }
        Ok(())
    }

    fn end_run(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.session = None;
        self.transition(StateId::Idle, sink);
        self.setpoint_c = 0.0;
        self.display_temps = self.live_temps();
        self.idle_outputs(hw);
    }

    fn abort(&mut self, session: &mut RunSession, faults: u8, sink: &mut impl EventSink) {
        warn!(
            "run aborted at {}s: faults=0b{:08b}",
            session.elapsed_secs, faults
        );
        session.aborted = Some(faults);
        if session.mode == RunMode::Reflow {
            self.transition(StateId::Cooling, sink);
        }
        for c in &mut self.controllers {
            c.set_mode(ControlMode::Manual);
        }
        sink.emit(&AppEvent::RunAborted { faults });
    }

    /// Feed elapsed time to the profile machine; returns (setpoint, heating).
    fn advance_profile(&mut self, session: &mut RunSession, sink: &mut impl EventSink) -> (f32, bool) {
        let before = self.fsm.current_state();
        self.profile.elapsed_secs = session.elapsed_secs as f32;
        self.fsm.tick(&mut self.profile);
        let after = self.fsm.current_state();

        if after != before {
            sink.emit(&AppEvent::PhaseChanged {
                from: before,
                to: after,
            });
            if after == StateId::Cooling && !session.completed {
                session.completed = true;
                sink.emit(&AppEvent::RunCompleted {
                    elapsed_secs: session.elapsed_secs,
                });
                info!("reflow complete at {}s", session.elapsed_secs);
            }
        }
        (self.profile.setpoint_c, self.profile.heaters_enabled)
    }

    fn transition(&mut self, to: StateId, sink: &mut impl EventSink) {
        let from = self.fsm.current_state();
        if from != to {
            self.fsm.force_transition(to, &mut self.profile);
            sink.emit(&AppEvent::PhaseChanged { from, to });
        }
    }

    /// Run both controllers and apply their duty.
    fn drive(&mut self, heating: bool, hw: &mut impl ActuatorPort) {
        for zone in Zone::ALL {
            let i = zone.index();
            let c = &mut self.controllers[i];
            self.duty[i] = if heating {
                c.set_mode(ControlMode::Automatic);
                c.compute(self.readings.zone(zone).celsius, self.setpoint_c, self.now_ms)
            } else {
                c.set_mode(ControlMode::Manual);
                0.0
            };
            hw.set_heater_duty(zone, self.duty[i]);
        }
    }

    fn idle_outputs(&mut self, hw: &mut impl ActuatorPort) {
        for c in &mut self.controllers {
            c.set_mode(ControlMode::Manual);
        }
        self.duty = [0.0; 2];
        self.setpoint_c = 0.0;
        hw.all_off();
    }

    fn reconfigure_controllers(&mut self) {
        for zone in Zone::ALL {
            self.controllers[zone.index()].configure(self.store.gains(zone));
        }
    }

    fn parameter_changed(&mut self, field: ParamField, value: f32, sink: &mut impl EventSink) {
        if field.kind() == FieldKind::Gain {
            self.reconfigure_controllers();
        }
        sink.emit(&AppEvent::ParameterChanged { field, value });
    }
}
