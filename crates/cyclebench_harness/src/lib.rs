//! Cycle-accurate stimulus/response harness for clocked designs.
//!
//! A design under test is reached only through its pins, via the
//! [`Backend`] trait. All harness state lives in an explicit
//! [`SimContext`]: simulated time, the event queue of clock toggles, edge
//! counters, and writes waiting for the next checkpoint.
//!
//! # Usage
//!
//! ```ignore
//! use cyclebench_harness::{apply_reset, Scenario, ScenarioScheduler, SimContext};
//!
//! let mut sched = ScenarioScheduler::new();
//! sched.register(
//!     Scenario::new("test_reset")
//!         .start_clock("clk", "40ns".parse()?)
//!         .reset(apply_reset("clk", "rst_n", 20, "ena", ["ui_in", "uio_in"]))
//!         .wait_cycles("clk", 50)
//!         .assert_resolvable("uo_out", "uo_out has X or Z after reset!"),
//! )?;
//! let report = sched.run(&mut SimContext::new(Box::new(backend)));
//! assert!(report.passed());
//! ```
//!
//! # Modules
//!
//! - `backend`: Pin-level simulator boundary
//! - `context`: Simulated time, clocks, pending writes
//! - `clock`, `driver`, `waiter`, `reset`, `resolve`: Scenario primitives
//! - `scenario`: Scenarios as step programs
//! - `kernel`: Discrete-event task execution
//! - `runner`, `scheduler`: Per-scenario and per-run execution
//! - `report`: Verdicts and diagnostics
//! - `waveform`: VCD tracing
//! - `logging`: tracing subscriber setup

#![warn(missing_docs)]

pub mod backend;
pub mod clock;
pub mod context;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod logging;
pub mod report;
pub mod reset;
pub mod resolve;
pub mod runner;
pub mod scenario;
pub mod scheduler;
pub mod waiter;
pub mod waveform;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Backend, PinDirection, PinInfo};
pub use context::SimContext;
pub use error::{
    AssertionError, BackendError, ResolvabilityError, ScenarioError, SchedulerError,
    StimulusError,
};
pub use kernel::{Task, TaskPoll};
pub use report::{AssertionRecord, LogEntry, RunReport, RunSummary, SampleRecord, ScenarioReport};
pub use reset::{apply_reset, ResetSequence};
pub use resolve::assert_resolvable;
pub use runner::ScenarioRunner;
pub use scenario::{Condition, ObserveMode, Scenario, ScenarioState, Step};
pub use scheduler::ScenarioScheduler;
pub use waiter::{wait_cycles, WaitTarget};
pub use waveform::{VcdRecorder, WaveformRecorder};
