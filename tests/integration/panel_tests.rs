//! Front panel driving the supervisor: encoder and button in, parameters
//! and storage out, wired the way the firmware loop wires them.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::mock_hw::{MockPlate, RecordingSink, started};

use hotplate::adapters::eeprom::EepromAdapter;
use hotplate::adapters::panel::{ButtonPanel, MenuEntry};
use hotplate::app::events::{AppEvent, RunMode};
use hotplate::app::ports::MenuPort;
use hotplate::app::service::Supervisor;
use hotplate::config::Zone;
use hotplate::drivers::button::ButtonDriver;
use hotplate::input::SharedDelta;
use hotplate::params::{ParamField, ParamStore};

struct Bench {
    sup: Supervisor,
    plate: MockPlate,
    sink: RecordingSink,
    panel: ButtonPanel,
    delta: SharedDelta,
    eeprom: EepromAdapter,
    stamp: &'static AtomicU32,
    now_ms: u32,
}

impl Bench {
    fn new(stamp: &'static AtomicU32) -> Self {
        let (sup, plate, sink) = started(25.0);
        let mut bench = Self {
            sup,
            plate,
            sink,
            panel: ButtonPanel::new(ButtonDriver::new(stamp)),
            delta: SharedDelta::new(),
            eeprom: EepromAdapter::new().unwrap(),
            stamp,
            now_ms: 1_000,
        };
        bench.cycle();
        bench
    }

    /// One pass of the control loop.
    fn cycle(&mut self) {
        let now = u64::from(self.now_ms);
        let steps = self.sup.poll_input(&self.delta);
        self.panel.navigate(steps);
        while let Some(cmd) = self.panel.poll_command() {
            let _ = self
                .sup
                .handle_command(cmd, now, &mut self.plate, &mut self.sink);
        }
        self.sup.tick(now, &mut self.plate, &mut self.sink);
        self.panel.render(&self.sup.status());
        self.sup.flush_config(&mut self.eeprom, &mut self.sink).unwrap();
        self.now_ms += 50;
    }

    fn turn(&mut self, steps: i32) {
        self.delta.add(steps);
        self.cycle();
    }

    fn press(&mut self, hold_ms: u32) {
        self.stamp.store(self.now_ms, Ordering::Release);
        let t = self.now_ms;
        for at in [t, t + 40, t + hold_ms] {
            self.panel.update(at, true);
        }
        self.panel.update(t + hold_ms + 50, false);
        self.now_ms = t + hold_ms + 100;
        self.cycle();
    }

    fn short_press(&mut self) {
        self.press(200);
    }

    fn long_press(&mut self) {
        self.press(1_600);
    }
}

#[test]
fn rotate_select_commit_and_save_reach_storage() {
    static STAMP: AtomicU32 = AtomicU32::new(0);
    let mut b = Bench::new(&STAMP);

    // Start reflow, start constant, then the profile fields in order.
    b.turn(6);
    assert_eq!(b.panel.selected(), MenuEntry::Edit(ParamField::PeakTemp));

    b.short_press();
    assert_eq!(b.sup.status().editing, Some((ParamField::PeakTemp, 185.0)));

    b.turn(5);
    assert_eq!(b.sup.status().editing, Some((ParamField::PeakTemp, 190.0)));
    assert_eq!(
        b.panel.selected(),
        MenuEntry::Edit(ParamField::PeakTemp),
        "steps go to the edit, not the cursor"
    );

    b.short_press();
    assert_eq!(b.sup.status().editing, None);
    assert_eq!(b.sup.params().params().profile.peak_c, 190);
    assert!(!b.sink.contains(&AppEvent::ConfigSaved));

    b.long_press();
    assert!(b.sink.contains(&AppEvent::ConfigSaved));

    let mut restored = ParamStore::default();
    restored.load(&b.eeprom).unwrap();
    assert_eq!(restored.params().profile.peak_c, 190);
}

#[test]
fn cancelled_edit_leaves_gains_alone() {
    static STAMP: AtomicU32 = AtomicU32::new(0);
    let mut b = Bench::new(&STAMP);

    // Scroll backwards past the constant setpoint to zone 2 Kd.
    b.turn(-2);
    assert_eq!(b.panel.selected(), MenuEntry::Edit(ParamField::Kd(Zone::Two)));
    b.short_press();
    b.turn(10);
    assert_eq!(b.sup.status().editing, Some((ParamField::Kd(Zone::Two), 3.55)));

    b.long_press();
    assert_eq!(b.sup.status().editing, None);
    assert_eq!(b.sup.params().gains(Zone::Two).kd, 3.45);
    assert!(!b.sup.save_pending());
}

#[test]
fn constant_run_setpoint_is_tuned_from_the_panel() {
    static STAMP: AtomicU32 = AtomicU32::new(0);
    let mut b = Bench::new(&STAMP);

    b.turn(1);
    b.short_press();
    assert_eq!(b.sup.run_mode(), Some(RunMode::Constant));
    assert_eq!(b.sup.setpoint_c(), 35.0);

    b.short_press();
    b.turn(15);
    b.short_press();
    b.cycle();
    assert_eq!(b.sup.setpoint_c(), 50.0);

    b.long_press();
    assert!(!b.sup.is_running());
    assert!(b.plate.heaters_off());
}
