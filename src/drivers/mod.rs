//! Heater drivers, front-panel button, hardware initialisation and the
//! task watchdog.

pub mod button;
pub mod heater;
pub mod hw_init;
pub mod watchdog;
