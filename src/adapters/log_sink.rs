//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC via `esp_idf_logger` on the device).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | supervisor idle"),
            AppEvent::RunStarted { mode, initial_temp_c } => {
                info!("RUN   | {:?} started from {:.1}\u{00b0}C", mode, initial_temp_c);
            }
            AppEvent::PhaseChanged { from, to } => info!("PHASE | {} -> {}", from, to),
            AppEvent::RunCompleted { elapsed_secs } => {
                info!("RUN   | profile complete after {}s, cooling", elapsed_secs);
            }
            AppEvent::RunAborted { faults } => {
                error!("RUN   | aborted, faults=0b{:08b}", faults);
            }
            AppEvent::RunStopped { mode, elapsed_secs } => {
                info!("RUN   | {:?} stopped at {}s", mode, elapsed_secs);
            }
            AppEvent::FaultDetected(flags) => warn!("FAULT | detected, flags=0b{:08b}", flags),
            AppEvent::FaultCleared => info!("FAULT | all cleared"),
            AppEvent::ParameterChanged { field, value } => info!("PARAM | {} = {}", field, value),
            AppEvent::ConfigSaved => info!("PARAM | saved"),
            AppEvent::ConfigLoaded { from_storage } => {
                if *from_storage {
                    info!("PARAM | loaded from storage");
                } else {
                    info!("PARAM | defaults in use");
                }
            }
        }
    }
}
