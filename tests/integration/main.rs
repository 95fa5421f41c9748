//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the supervisor against
//! mock adapters. All tests run on the host with no real hardware.

mod mock_hw;
mod panel_tests;
mod persistence_tests;
mod reflow_run_tests;
mod safety_tests;
