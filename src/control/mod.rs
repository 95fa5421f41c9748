//! Closed-loop heater control.

pub mod pid;
