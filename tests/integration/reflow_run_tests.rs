//! Run control end to end: Supervisor → profile FSM → controllers → heaters.

use crate::mock_hw::started;

use hotplate::app::commands::AppCommand;
use hotplate::app::events::{AppEvent, RunMode};
use hotplate::config::Zone;
use hotplate::control::pid::ControlMode;
use hotplate::error::{Error, RunError};
use hotplate::fsm::StateId;

// ── Reflow profile scenario ───────────────────────────────────

#[test]
fn default_profile_follows_the_curve() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    assert_eq!(sup.initial_temp_c(), Some(25.0));
    assert_eq!(sup.phase(), StateId::Ramp);

    sup.tick(50_000, &mut plate, &mut sink);
    assert_eq!(sup.phase(), StateId::Ramp);
    assert_eq!(sup.elapsed_secs(), 50);
    assert!((sup.setpoint_c() - 70.0).abs() < 1e-3, "got {}", sup.setpoint_c());
    assert!(plate.any_heating(), "plate below setpoint must heat");
    assert_eq!(sup.controller_mode(Zone::One), ControlMode::Automatic);

    sup.tick(180_000, &mut plate, &mut sink);
    assert_eq!(sup.phase(), StateId::ReflowHold);
    assert_eq!(sup.setpoint_c(), 185.0);

    sup.tick(220_000, &mut plate, &mut sink);
    assert_eq!(sup.phase(), StateId::Cooling);
    assert_eq!(sup.setpoint_c(), 0.0);
    assert_eq!(sup.controller_mode(Zone::One), ControlMode::Manual);
    assert_eq!(sup.controller_mode(Zone::Two), ControlMode::Manual);
    assert!(plate.heaters_off());
    assert!(sink.contains(&AppEvent::RunCompleted { elapsed_secs: 220 }));
}

#[test]
fn soak_midpoint_interpolates() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 1_000, &mut plate, &mut sink)
        .unwrap();
    // 127.5 s into the run: halfway through 100..155
    sup.tick(128_500, &mut plate, &mut sink);
    assert_eq!(sup.elapsed_secs(), 127);
    assert_eq!(sup.phase(), StateId::Soak);
    let expected = 115.0 + 30.0 * (27.0 / 55.0);
    assert!((sup.setpoint_c() - expected).abs() < 1e-3);
}

#[test]
fn phases_are_announced_in_order() {
    let (mut sup, mut plate, mut sink) = started(30.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    for secs in 1..=230u64 {
        sup.tick(secs * 1000, &mut plate, &mut sink);
    }
    let phases: Vec<StateId> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        [
            StateId::Ramp,
            StateId::Soak,
            StateId::ReflowRamp,
            StateId::ReflowHold,
            StateId::Cooling
        ]
    );
}

#[test]
fn elapsed_freezes_in_cooling_until_acknowledged() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    sup.tick(216_000, &mut plate, &mut sink);
    assert_eq!(sup.phase(), StateId::Cooling);
    sup.tick(400_000, &mut plate, &mut sink);
    assert_eq!(sup.elapsed_secs(), 216);
    assert_eq!(sup.phase(), StateId::Cooling, "cooling is terminal");

    sup.handle_command(AppCommand::Acknowledge, 401_000, &mut plate, &mut sink)
        .unwrap();
    assert!(!sup.is_running());
    assert_eq!(sup.phase(), StateId::Idle);
}

// ── Constant temperature ──────────────────────────────────────

#[test]
fn constant_mode_holds_setpoint_regardless_of_time() {
    let (mut sup, mut plate, mut sink) = started(20.0);
    sup.handle_command(AppCommand::StartConstant, 0, &mut plate, &mut sink)
        .unwrap();
    for ms in [200, 50_000, 180_000, 3_600_000] {
        sup.tick(ms, &mut plate, &mut sink);
        assert_eq!(sup.setpoint_c(), 35.0);
        assert_eq!(sup.phase(), StateId::Idle);
        assert_eq!(sup.run_mode(), Some(RunMode::Constant));
    }
    assert!(plate.any_heating());
}

#[test]
fn constant_setpoint_can_be_edited_live() {
    let (mut sup, mut plate, mut sink) = started(20.0);
    sup.handle_command(AppCommand::StartConstant, 0, &mut plate, &mut sink)
        .unwrap();
    sup.handle_command(
        AppCommand::SetParameter(hotplate::params::ParamField::ConstantSetpoint, 60.0),
        100,
        &mut plate,
        &mut sink,
    )
    .unwrap();
    sup.tick(1_000, &mut plate, &mut sink);
    assert_eq!(sup.setpoint_c(), 60.0);
}

// ── Single active run ─────────────────────────────────────────

#[test]
fn second_start_is_rejected_and_first_run_continues() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    sup.tick(10_000, &mut plate, &mut sink);

    let err = sup
        .handle_command(AppCommand::StartConstant, 11_000, &mut plate, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Run(RunError::AlreadyRunning));
    assert_eq!(sup.run_mode(), Some(RunMode::Reflow));

    sup.tick(12_000, &mut plate, &mut sink);
    assert_eq!(sup.elapsed_secs(), 12);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RunStarted { .. })),
        1
    );
}

#[test]
fn stop_returns_to_idle_with_heaters_off() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    sup.tick(30_000, &mut plate, &mut sink);
    assert!(plate.any_heating());

    sup.handle_command(AppCommand::Stop, 31_000, &mut plate, &mut sink)
        .unwrap();
    assert!(!sup.is_running());
    assert_eq!(sup.phase(), StateId::Idle);
    assert!(plate.heaters_off());
    assert!(sink.contains(&AppEvent::RunStopped {
        mode: RunMode::Reflow,
        elapsed_secs: 30
    }));

    // A fresh run is allowed afterwards and re-snapshots the origin.
    plate.temps = [40.0; 2];
    sup.handle_command(AppCommand::StartReflow, 40_000, &mut plate, &mut sink)
        .unwrap();
    assert_eq!(sup.initial_temp_c(), Some(40.0));
    sup.tick(40_000, &mut plate, &mut sink);
    assert_eq!(sup.elapsed_secs(), 0);
}

#[test]
fn idle_keeps_heaters_off_and_samples_slowly() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    for ms in (0..30_000).step_by(200) {
        sup.tick(ms, &mut plate, &mut sink);
        assert!(plate.heaters_off());
    }
    // First tick, then every 10 s.
    assert_eq!(plate.reads, 3);
    assert_eq!(sup.controller_mode(Zone::Two), ControlMode::Manual);
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn display_temperatures_latch_once_per_second() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartConstant, 0, &mut plate, &mut sink)
        .unwrap();

    plate.temps = [26.0, 27.0];
    sup.tick(200, &mut plate, &mut sink);
    let status = sup.status();
    assert_eq!(status.live_temps_c, [26.0, 27.0]);
    assert_eq!(status.display_temps_c, [25.0, 25.0]);

    sup.tick(1_000, &mut plate, &mut sink);
    assert_eq!(sup.status().display_temps_c, [26.0, 27.0]);
}
