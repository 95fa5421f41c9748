//! Hot plate firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter   LogEventSink   EepromAdapter  ButtonPanel │
//! │  (Sensor+Actuator) (EventSink)    (StoragePort)  (MenuPort)  │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            Supervisor (pure logic)                     │  │
//! │  │  Safety · Profile FSM · PID×2 · ParamStore             │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{error, info, warn};

use hotplate::adapters::eeprom::EepromAdapter;
use hotplate::adapters::hardware::{Adc1Thermistors, HardwareAdapter};
use hotplate::adapters::log_sink::LogEventSink;
use hotplate::adapters::panel::ButtonPanel;
use hotplate::adapters::time::MonotonicClock;
use hotplate::app::ports::MenuPort;
use hotplate::app::service::Supervisor;
use hotplate::config::{ThermistorCalibration, TimingConfig};
use hotplate::drivers::button::{BUTTON_ISR_TIMESTAMP, ButtonDriver};
use hotplate::drivers::heater::HeaterDriver;
use hotplate::drivers::hw_init;
use hotplate::drivers::watchdog::Watchdog;
use hotplate::input::SELECTION_DELTA;
use hotplate::params::ParamStore;
use hotplate::pins;
use hotplate::sensors::SensorHub;

/// Longer than the slowest tick (sampling plus an NVS commit).
const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HotPlate v{:<26}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Heaters are unconfigured; halt and let the watchdog reset us.
        error!("HAL init failed: {}; halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        warn!("ISR service init failed: {}; continuing without encoder/button", e);
    }
    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    let timing = TimingConfig::default();
    let calibration = ThermistorCalibration {
        adc_full_scale: pins::ADC_FULL_SCALE,
        ..ThermistorCalibration::default()
    };
    let sensors = SensorHub::new(Adc1Thermistors, FreeRtos, [calibration; 2], &timing);
    let mut hw = HardwareAdapter::new(
        sensors,
        [
            HeaterDriver::new(hw_init::LEDC_CH_HEATER_1),
            HeaterDriver::new(hw_init::LEDC_CH_HEATER_2),
        ],
    );

    // ── 3. Adapters + supervisor ──────────────────────────────
    let mut sink = LogEventSink::new();
    let mut panel = ButtonPanel::new(ButtonDriver::new(&BUTTON_ISR_TIMESTAMP));
    let clock = MonotonicClock::new();

    let mut storage = EepromAdapter::new().map_err(|e| anyhow::anyhow!("storage init: {e}"))?;
    let interval_ms = timing.control_loop_interval_ms;
    let mut supervisor = Supervisor::new(ParamStore::default(), timing);
    supervisor.start(&mut sink);
    if let Err(e) = supervisor.load_config(&storage, &mut sink) {
        warn!("Parameters not restored ({}), using defaults", e);
    }

    info!("System ready. Entering control loop.");

    // ── 4. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();

        // Steps feed the active edit first; leftovers scroll the menu.
        let nav_steps = supervisor.poll_input(&SELECTION_DELTA);
        panel.navigate(nav_steps);

        let pressed = !hw_init::gpio_read(pins::BUTTON_GPIO);
        panel.update(now_ms as u32, pressed);
        while let Some(cmd) = panel.poll_command() {
            if let Err(e) = supervisor.handle_command(cmd, now_ms, &mut hw, &mut sink) {
                warn!("{:?} refused: {}", cmd, e);
            }
        }

        supervisor.tick(now_ms, &mut hw, &mut sink);
        panel.render(&supervisor.status());

        if let Err(e) = supervisor.flush_config(&mut storage, &mut sink) {
            warn!("Parameter save failed: {}", e);
        }

        watchdog.feed();
        FreeRtos::delay_ms(interval_ms);
    }
}
