//! Per-scenario and per-run verdicts.

use cyclebench_common::{LogicVec, SimTime};
use serde::Serialize;

use crate::scenario::ScenarioState;

/// Outcome of one assertion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionRecord {
    /// Whether the check held.
    pub passed: bool,
    /// Signal that was checked.
    pub signal: String,
    /// What the check required, e.g. `no X/Z bits`.
    pub expected: String,
    /// Value read at the deciding instant, if one was read.
    pub observed: Option<String>,
    /// Cycle of the deciding instant.
    pub cycle: u64,
    /// Full diagnostic.
    pub message: String,
}

/// A line of scenario-local diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// When it was written.
    pub time: SimTime,
    /// Cycle at which it was written.
    pub cycle: u64,
    /// The text.
    pub message: String,
}

/// A recorded signal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleRecord {
    /// Caller-chosen label.
    pub label: String,
    /// Sampled signal.
    pub signal: String,
    /// Value at the sampling instant.
    pub value: LogicVec,
    /// Cycle of the sampling instant.
    pub cycle: u64,
    /// Time of the sampling instant.
    pub time: SimTime,
}

/// Everything known about one scenario after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Final lifecycle state.
    pub state: ScenarioState,
    /// Every assertion evaluated, in order.
    pub assertions: Vec<AssertionRecord>,
    /// Scenario-local log.
    pub log: Vec<LogEntry>,
    /// Recorded samples.
    pub samples: Vec<SampleRecord>,
    /// The error that ended the scenario, if any.
    pub failure: Option<String>,
    /// Time the scenario started.
    pub start_time: SimTime,
    /// Time the scenario reached its final state.
    pub end_time: SimTime,
    /// Rising edges of the scenario's first clock while it ran.
    pub cycles: u64,
}

impl ScenarioReport {
    /// A report for a scenario that never ran.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ScenarioState::Pending,
            assertions: Vec::new(),
            log: Vec::new(),
            samples: Vec::new(),
            failure: None,
            start_time: SimTime::ZERO,
            end_time: SimTime::ZERO,
            cycles: 0,
        }
    }

    /// Returns true if the scenario passed.
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }
}

/// Verdict counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Scenarios that passed.
    pub passed: usize,
    /// Scenarios that failed.
    pub failed: usize,
    /// Scenarios that errored.
    pub errored: usize,
    /// Scenarios that never ran.
    pub pending: usize,
}

/// Result of running a set of scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// One report per selected scenario, in registration order.
    pub scenarios: Vec<ScenarioReport>,
    /// Set when a backend error ended the run early.
    pub aborted: Option<String>,
    /// Simulated time when the run ended.
    pub final_time: SimTime,
}

impl RunReport {
    /// The run passes iff every selected scenario passed and the run was not aborted.
    pub fn passed(&self) -> bool {
        self.aborted.is_none() && self.scenarios.iter().all(ScenarioReport::passed)
    }

    /// Counts scenarios by final state.
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for s in &self.scenarios {
            match s.state {
                ScenarioState::Passed => summary.passed += 1,
                ScenarioState::Failed => summary.failed += 1,
                ScenarioState::Errored => summary.errored += 1,
                ScenarioState::Pending | ScenarioState::Running => summary.pending += 1,
            }
        }
        summary
    }

    /// Looks up a scenario report by name.
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}
