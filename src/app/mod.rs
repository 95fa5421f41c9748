//! Application core: pure domain logic, zero I/O.
//!
//! The [`service::Supervisor`] owns run sessions, drives the profile FSM and
//! the per-zone PID loops, and gates heater output on safety faults.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
