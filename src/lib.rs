//! Dual-zone solder reflow hot plate controller.
//!
//! Exposes the control core (sensing, PID, reflow profile machine,
//! parameter store, process supervisor) for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(feature = "espidf")]`
//! within each module, with host stand-ins alongside.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod input;
pub mod params;
pub mod safety;
pub mod sensors;

pub mod adapters;
pub mod drivers;
pub mod pins;
