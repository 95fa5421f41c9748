//! Parameter persistence through the supervisor and the EEPROM adapter.

use crate::mock_hw::{RecordingSink, started};

use hotplate::adapters::eeprom::EepromAdapter;
use hotplate::app::commands::AppCommand;
use hotplate::app::events::AppEvent;
use hotplate::app::ports::{ConfigError, StoragePort};
use hotplate::app::service::Supervisor;
use hotplate::config::{ParameterSet, TimingConfig, Zone};
use hotplate::params::layout;
use hotplate::params::{ParamField, ParamStore};

fn fresh_supervisor(sink: &mut RecordingSink) -> Supervisor {
    let mut sup = Supervisor::new(ParamStore::default(), TimingConfig::default());
    sup.start(sink);
    sup
}

#[test]
fn first_boot_falls_back_to_defaults() {
    let eeprom = EepromAdapter::new().unwrap();
    let mut sink = RecordingSink::new();
    let mut sup = fresh_supervisor(&mut sink);

    assert_eq!(sup.load_config(&eeprom, &mut sink), Err(ConfigError::NotFound));
    assert_eq!(*sup.params().params(), ParameterSet::default());
    assert!(sink.contains(&AppEvent::ConfigLoaded { from_storage: false }));
}

#[test]
fn saved_edits_survive_a_restart() {
    let mut eeprom = EepromAdapter::new().unwrap();
    let (mut sup, mut plate, mut sink) = started(25.0);

    for (field, value) in [
        (ParamField::PeakTemp, 210.0),
        (ParamField::HoldTime, 45.0),
        (ParamField::Kp(Zone::Two), 4.25),
        (ParamField::Ki(Zone::One), 0.07),
        (ParamField::ConstantSetpoint, 80.0),
    ] {
        sup.handle_command(AppCommand::SetParameter(field, value), 0, &mut plate, &mut sink)
            .unwrap();
    }

    // Nothing is written until the loop flushes the request.
    assert!(!sup.flush_config(&mut eeprom, &mut sink).unwrap());
    sup.handle_command(AppCommand::SaveConfig, 0, &mut plate, &mut sink)
        .unwrap();
    assert!(sup.save_pending());
    assert!(sup.flush_config(&mut eeprom, &mut sink).unwrap());
    assert!(!sup.save_pending());
    assert!(sink.contains(&AppEvent::ConfigSaved));

    let mut sink2 = RecordingSink::new();
    let mut restarted = fresh_supervisor(&mut sink2);
    restarted.load_config(&eeprom, &mut sink2).unwrap();
    let p = restarted.params();
    assert_eq!(p.params().profile.peak_c, 210);
    assert_eq!(p.params().profile.hold_secs, 45);
    assert_eq!(p.gains(Zone::Two).kp, 4.25);
    assert_eq!(p.gains(Zone::One).ki, 0.07);
    assert_eq!(p.params().constant_setpoint_c, 80);
    assert!(sink2.contains(&AppEvent::ConfigLoaded { from_storage: true }));
}

#[test]
fn corrupted_image_fails_closed() {
    let mut eeprom = EepromAdapter::new().unwrap();
    let mut store = ParamStore::default();
    store.set(ParamField::SoakTemp, 150.0).unwrap();
    store.save(&mut eeprom).unwrap();

    // Flip one profile byte behind the checksum's back.
    let mut byte = [0u8; 1];
    eeprom.read_bytes(layout::ADDR_PROFILE, &mut byte).unwrap();
    eeprom
        .write_bytes(layout::ADDR_PROFILE, &[byte[0] ^ 0x01])
        .unwrap();

    let mut sink = RecordingSink::new();
    let mut sup = fresh_supervisor(&mut sink);
    assert_eq!(sup.load_config(&eeprom, &mut sink), Err(ConfigError::Corrupted));
    assert_eq!(*sup.params().params(), ParameterSet::default());
}

#[test]
fn rotary_edit_then_save_round_trips() {
    let mut eeprom = EepromAdapter::new().unwrap();
    let (mut sup, mut plate, mut sink) = started(25.0);
    let delta = hotplate::input::SharedDelta::new();

    sup.handle_command(
        AppCommand::BeginEdit(ParamField::Kd(Zone::One)),
        0,
        &mut plate,
        &mut sink,
    )
    .unwrap();
    delta.add(5);
    delta.add(-2);
    assert_eq!(sup.poll_input(&delta), 0, "steps go to the edit");
    assert_eq!(
        sup.status().editing,
        Some((ParamField::Kd(Zone::One), 3.48))
    );

    sup.handle_command(AppCommand::CommitEdit, 0, &mut plate, &mut sink)
        .unwrap();
    sup.handle_command(AppCommand::SaveConfig, 0, &mut plate, &mut sink)
        .unwrap();
    sup.flush_config(&mut eeprom, &mut sink).unwrap();

    let mut restored = ParamStore::default();
    restored.load(&eeprom).unwrap();
    assert_eq!(restored.gains(Zone::One).kd, 3.48);
    assert_eq!(restored.gains(Zone::Two).kd, 3.45);
}
