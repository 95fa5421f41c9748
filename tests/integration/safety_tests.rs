//! Fault handling during runs: abort, latch, acknowledge.

use crate::mock_hw::{RecordingSink, started};

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use hotplate::adapters::hardware::HardwareAdapter;
use hotplate::app::commands::AppCommand;
use hotplate::app::events::{AppEvent, RunMode};
use hotplate::app::service::Supervisor;
use hotplate::config::{ThermistorCalibration, TimingConfig, Zone};
use hotplate::control::pid::ControlMode;
use hotplate::error::{Error, RunError, SafetyFault};
use hotplate::fsm::StateId;
use hotplate::params::ParamStore;
use hotplate::sensors::{AnalogInput, SensorHub};

#[test]
fn zone_fault_aborts_reflow_into_cooling() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    sup.tick(60_000, &mut plate, &mut sink);
    assert!(plate.any_heating());

    plate.faulted[1] = true;
    sup.tick(61_000, &mut plate, &mut sink);

    let mask = SafetyFault::Zone2Sensor.mask();
    assert_eq!(sup.phase(), StateId::Cooling);
    assert!(plate.heaters_off());
    assert_eq!(sup.controller_mode(Zone::One), ControlMode::Manual);
    assert_eq!(sup.controller_mode(Zone::Two), ControlMode::Manual);
    assert!(sink.contains(&AppEvent::FaultDetected(mask)));
    assert!(sink.contains(&AppEvent::RunAborted { faults: mask }));
    assert!(sup.status().aborted);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RunCompleted { .. })),
        0,
        "an aborted run is not a completed one"
    );
}

#[test]
fn abort_stays_latched_after_fault_clears() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    plate.faulted[0] = true;
    sup.tick(5_000, &mut plate, &mut sink);
    assert_eq!(sup.elapsed_secs(), 0, "elapsed freezes at the abort");

    plate.faulted[0] = false;
    for secs in 6..20u64 {
        sup.tick(secs * 1000, &mut plate, &mut sink);
        assert!(plate.heaters_off());
    }
    assert!(sink.contains(&AppEvent::FaultCleared));
    assert_eq!(sup.fault_flags(), 0);
    assert_eq!(sup.phase(), StateId::Cooling);
    assert!(sup.is_running(), "aborted session waits for the operator");
    assert_eq!(sup.elapsed_secs(), 0);

    sup.handle_command(AppCommand::Acknowledge, 20_000, &mut plate, &mut sink)
        .unwrap();
    assert!(!sup.is_running());
    assert_eq!(sup.phase(), StateId::Idle);
}

#[test]
fn constant_run_aborts_without_touching_the_profile() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartConstant, 0, &mut plate, &mut sink)
        .unwrap();
    sup.tick(1_000, &mut plate, &mut sink);
    assert!(plate.any_heating());

    plate.temps[0] = -40.0;
    plate.faulted[0] = true;
    sup.tick(2_000, &mut plate, &mut sink);
    assert!(plate.heaters_off());
    assert_eq!(sup.setpoint_c(), 0.0);
    assert_eq!(sup.phase(), StateId::Idle);
    assert_eq!(sup.run_mode(), Some(RunMode::Constant));
    assert!(sup.status().aborted);

    sup.handle_command(AppCommand::Stop, 3_000, &mut plate, &mut sink)
        .unwrap();
    assert!(!sup.is_running());
}

#[test]
fn over_temperature_aborts_like_a_sensor_fault() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartConstant, 0, &mut plate, &mut sink)
        .unwrap();
    plate.temps[1] = 275.0;
    sup.tick(1_000, &mut plate, &mut sink);
    let mask = SafetyFault::OverTemperature.mask();
    assert!(sink.contains(&AppEvent::RunAborted { faults: mask }));
    assert!(plate.heaters_off());
}

#[test]
fn start_is_refused_while_a_zone_is_faulted() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    plate.faulted[0] = true;
    let err = sup
        .handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap_err();
    assert_eq!(
        err,
        Error::Run(RunError::Faulted(SafetyFault::Zone1Sensor.mask()))
    );
    assert!(!sup.is_running());
    assert!(plate.heaters_off());

    // The start sample itself clears the fault once the sensor recovers.
    plate.faulted[0] = false;
    sup.handle_command(AppCommand::StartReflow, 1_000, &mut plate, &mut sink)
        .unwrap();
    assert!(sup.is_running());
}

#[test]
fn acknowledge_does_nothing_mid_run() {
    let (mut sup, mut plate, mut sink) = started(25.0);
    sup.handle_command(AppCommand::StartReflow, 0, &mut plate, &mut sink)
        .unwrap();
    sup.tick(10_000, &mut plate, &mut sink);
    sup.handle_command(AppCommand::Acknowledge, 10_500, &mut plate, &mut sink)
        .unwrap();
    assert!(sup.is_running());
    assert_eq!(sup.phase(), StateId::Ramp);
}

// ── Stuck sensor through the real sensor chain ────────────────

/// ADC whose zone 2 divider is frozen at one count.
struct FrozenZoneAdc {
    reads: u16,
}

impl AnalogInput for FrozenZoneAdc {
    fn read_counts(&mut self, zone: Zone) -> u16 {
        match zone {
            Zone::One => {
                self.reads = self.reads.wrapping_add(1);
                480 + self.reads % 20
            }
            Zone::Two => 500,
        }
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Default)]
struct Pwm(u16);

impl ErrorType for Pwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for Pwm {
    fn max_duty_cycle(&self) -> u16 {
        1023
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.0 = duty;
        Ok(())
    }
}

#[test]
fn frozen_thermistor_aborts_a_run_on_the_third_repeat() {
    let timing = TimingConfig::default();
    let hub = SensorHub::new(
        FrozenZoneAdc { reads: 0 },
        NoDelay,
        [ThermistorCalibration::default(); 2],
        &timing,
    );
    let mut hw = HardwareAdapter::new(hub, [Pwm::default(), Pwm::default()]);
    let mut sink = RecordingSink::new();
    let mut sup = Supervisor::new(ParamStore::default(), timing);
    sup.start(&mut sink);

    // Start sample is the first reading; no repeats yet.
    sup.handle_command(AppCommand::StartConstant, 0, &mut hw, &mut sink)
        .unwrap();
    sup.tick(200, &mut hw, &mut sink); // 1st repeat
    sup.tick(400, &mut hw, &mut sink); // 2nd repeat
    assert!(!sup.status().aborted);
    assert!(hw.heater(Zone::Two).0 > 0);

    sup.tick(600, &mut hw, &mut sink); // 3rd repeat
    assert!(sup.status().aborted);
    assert_eq!(sup.fault_flags(), SafetyFault::Zone2Sensor.mask());
    assert_eq!(hw.heater(Zone::One).0, 0);
    assert_eq!(hw.heater(Zone::Two).0, 0);
}
