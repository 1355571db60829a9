//! The canonical scenario suite for the VGA shooter design.
//!
//! Scenarios are built from a [`HarnessConfig`](cyclebench_config::HarnessConfig)
//! so pin names, control bits, clock periods and cycle counts all come from
//! `cyclebench.toml`. [`run_suite`] wires a backend, an optional VCD trace
//! and the scheduler together.

#![warn(missing_docs)]

pub mod controls;
pub mod error;
pub mod output;
pub mod suite;

pub use controls::ControlInputs;
pub use error::SuiteError;
pub use output::{Rgb, VgaOutput};
pub use suite::{run_suite, standard_suite, SCENARIO_NAMES};
