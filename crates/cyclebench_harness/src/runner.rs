//! Execution of one scenario as a cooperative task.

use std::collections::VecDeque;

use cyclebench_common::LogicVec;
use tracing::{debug, error, info, warn};

use crate::context::SimContext;
use crate::error::{AssertionError, BackendError, ScenarioError, StimulusError};
use crate::kernel::{Task, TaskPoll};
use crate::report::{AssertionRecord, LogEntry, SampleRecord, ScenarioReport};
use crate::scenario::{Condition, ObserveMode, Scenario, ScenarioState, Step};
use crate::waiter::{self, WaitTarget};
use crate::{clock, driver, resolve};

/// An in-progress [`Step::Observe`].
#[derive(Debug)]
struct Monitor {
    clock: String,
    signal: String,
    condition: Condition,
    mode: ObserveMode,
    message: String,
    /// Rising-edge count of the next sample.
    next_edge: u64,
    remaining: u64,
    held: bool,
}

/// Drives a [`Scenario`] through `Pending -> Running -> Passed | Failed | Errored`.
///
/// Steps run strictly in program order. The first failing step ends the
/// scenario as `Failed`; a [`BackendError`] ends it as `Errored` and is
/// returned to the kernel, which aborts the run.
pub struct ScenarioRunner {
    program: VecDeque<Step>,
    monitor: Option<Monitor>,
    report: ScenarioReport,
}

impl ScenarioRunner {
    /// Prepares `scenario` for execution.
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            program: scenario.steps().iter().cloned().collect(),
            monitor: None,
            report: ScenarioReport::pending(scenario.name()),
        }
    }

    /// The scenario name.
    pub fn name(&self) -> &str {
        &self.report.name
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ScenarioState {
        self.report.state
    }

    /// Marks a scenario that has not finished as `Errored`.
    ///
    /// Used when the run dies underneath it. Has no effect once a final
    /// state has been reached.
    pub fn abort(&mut self, ctx: &SimContext, reason: &str) {
        if self.report.state.is_terminal() {
            return;
        }
        self.log(ctx, format!("aborted: {reason}"));
        self.report.failure = Some(reason.to_string());
        self.finish(ctx, ScenarioState::Errored);
    }

    /// Consumes the runner and returns its report.
    pub fn into_report(self) -> ScenarioReport {
        self.report
    }

    fn log(&mut self, ctx: &SimContext, message: String) {
        self.report.log.push(LogEntry {
            time: ctx.now(),
            cycle: ctx.cycle(),
            message,
        });
    }

    fn record_pass(
        &mut self,
        ctx: &SimContext,
        signal: &str,
        expected: String,
        observed: &LogicVec,
        message: &str,
    ) {
        self.report.assertions.push(AssertionRecord {
            passed: true,
            signal: signal.to_string(),
            expected,
            observed: Some(observed.to_string()),
            cycle: ctx.cycle(),
            message: message.to_string(),
        });
    }

    fn finish(&mut self, ctx: &SimContext, state: ScenarioState) {
        self.report.state = state;
        self.report.end_time = ctx.now();
        self.report.cycles = ctx.cycle();
        self.monitor = None;
        self.program.clear();
    }

    /// Runs steps until a suspension point or the end of the program.
    fn advance(&mut self, ctx: &mut SimContext) -> Result<TaskPoll, ScenarioError> {
        if self.monitor.is_some() {
            if let Some(target) = self.sample_monitor(ctx)? {
                return Ok(TaskPoll::Suspended(target));
            }
        }
        while let Some(step) = self.program.pop_front() {
            if let Some(target) = self.execute(ctx, step)? {
                return Ok(TaskPoll::Suspended(target));
            }
        }
        Ok(TaskPoll::Done)
    }

    fn execute(
        &mut self,
        ctx: &mut SimContext,
        step: Step,
    ) -> Result<Option<WaitTarget>, ScenarioError> {
        debug!(scenario = %self.report.name, cycle = ctx.cycle(), ?step, "step");
        match step {
            Step::StartClock { clock, period } => {
                clock::start(ctx, &clock, period)?;
                self.log(ctx, format!("clock '{clock}' started, period {period}"));
            }
            Step::Set { signal, value } => driver::set(ctx, &signal, value)?,
            Step::SetUint { signal, value } => driver::set_u64(ctx, &signal, value)?,
            Step::Zero { signal } => driver::zero(ctx, &signal)?,
            Step::WaitCycles { clock, cycles } => {
                return Ok(Some(waiter::wait_cycles(ctx, &clock, cycles)?));
            }
            Step::Reset(sequence) => {
                self.log(
                    ctx,
                    format!(
                        "reset: '{}' asserted for {} cycles",
                        sequence.reset, sequence.assert_cycles
                    ),
                );
                for step in sequence.steps().into_iter().rev() {
                    self.program.push_front(step);
                }
            }
            Step::AssertResolvable { signal, message } => {
                let value = resolve::assert_resolvable(ctx, &signal, &message)?;
                self.record_pass(ctx, &signal, Condition::Resolvable.to_string(), &value, &message);
            }
            Step::Expect {
                signal,
                condition,
                message,
            } => {
                let value = ctx.observe(&signal)?;
                if !condition.holds(&value) {
                    return Err(AssertionError {
                        signal,
                        expected: condition.to_string(),
                        observed: value,
                        cycle: ctx.cycle(),
                        time: ctx.now(),
                        message,
                    }
                    .into());
                }
                self.record_pass(ctx, &signal, condition.to_string(), &value, &message);
            }
            Step::Observe {
                clock,
                signal,
                cycles,
                condition,
                mode,
                message,
            } => {
                if cycles == 0 {
                    let value = ctx.observe(&signal)?;
                    let monitor = Monitor {
                        clock,
                        signal,
                        condition,
                        mode,
                        message,
                        next_edge: 0,
                        remaining: 0,
                        held: false,
                    };
                    self.monitor = Some(monitor);
                    return self.judge(ctx, value).map(|()| None);
                }
                ctx.observe(&signal)?;
                let seen = ctx
                    .rising_edges(&clock)
                    .ok_or_else(|| StimulusError::ClockNotRunning {
                        clock: clock.clone(),
                    })?;
                self.log(
                    ctx,
                    format!("observing '{signal}' for {cycles} cycles: {condition} ({mode:?})"),
                );
                let target = WaitTarget::Edges {
                    clock: clock.clone(),
                    edges: seen + 1,
                };
                self.monitor = Some(Monitor {
                    clock,
                    signal,
                    condition,
                    mode,
                    message,
                    next_edge: seen + 1,
                    remaining: cycles,
                    held: false,
                });
                return Ok(Some(target));
            }
            Step::Sample { signal, label } => {
                let value = ctx.observe(&signal)?;
                let line = match value.to_u64() {
                    Some(n) => format!("{label} = {value} (0x{n:02x})"),
                    None => format!("{label} = {value}"),
                };
                info!(scenario = %self.report.name, cycle = ctx.cycle(), %signal, "{line}");
                self.log(ctx, line);
                self.report.samples.push(SampleRecord {
                    label,
                    signal,
                    value,
                    cycle: ctx.cycle(),
                    time: ctx.now(),
                });
            }
            Step::Log(message) => {
                info!(scenario = %self.report.name, cycle = ctx.cycle(), "{message}");
                self.log(ctx, message);
            }
        }
        Ok(None)
    }

    /// Takes one sample for the active monitor at its target edge.
    fn sample_monitor(&mut self, ctx: &SimContext) -> Result<Option<WaitTarget>, ScenarioError> {
        let Some(monitor) = self.monitor.as_mut() else {
            return Ok(None);
        };
        let value = ctx.observe(&monitor.signal)?;
        if monitor.mode == ObserveMode::Always && !monitor.condition.holds(&value) {
            return self.judge(ctx, value).map(|()| None);
        }
        monitor.held |= monitor.condition.holds(&value);
        monitor.remaining -= 1;
        if monitor.remaining > 0 {
            monitor.next_edge += 1;
            return Ok(Some(WaitTarget::Edges {
                clock: monitor.clock.clone(),
                edges: monitor.next_edge,
            }));
        }
        self.judge(ctx, value).map(|()| None)
    }

    /// Closes the active monitor with a verdict based on the final `value`.
    fn judge(&mut self, ctx: &SimContext, value: LogicVec) -> Result<(), ScenarioError> {
        let Some(monitor) = self.monitor.take() else {
            return Ok(());
        };
        let held_now = monitor.condition.holds(&value);
        let (passed, expected) = match monitor.mode {
            ObserveMode::Always => (held_now, format!("always {}", monitor.condition)),
            ObserveMode::Eventually => (
                monitor.held || held_now,
                format!("eventually {}", monitor.condition),
            ),
        };
        if !passed {
            return Err(AssertionError {
                signal: monitor.signal,
                expected,
                observed: value,
                cycle: ctx.cycle(),
                time: ctx.now(),
                message: monitor.message,
            }
            .into());
        }
        self.record_pass(ctx, &monitor.signal, expected, &value, &monitor.message);
        Ok(())
    }

    /// Records the error that ended the scenario and picks its final state.
    fn fail(&mut self, ctx: &SimContext, err: ScenarioError) -> Result<TaskPoll, BackendError> {
        let description = err.to_string();
        let failing = match &err {
            ScenarioError::Resolvability(e) => Some(AssertionRecord {
                passed: false,
                signal: e.signal.clone(),
                expected: Condition::Resolvable.to_string(),
                observed: Some(e.observed.to_string()),
                cycle: e.cycle,
                message: description.clone(),
            }),
            ScenarioError::Assertion(e) => Some(AssertionRecord {
                passed: false,
                signal: e.signal.clone(),
                expected: e.expected.clone(),
                observed: Some(e.observed.to_string()),
                cycle: e.cycle,
                message: description.clone(),
            }),
            ScenarioError::Stimulus(_) | ScenarioError::Backend(_) => None,
        };
        if let Some(record) = failing {
            self.report.assertions.push(record);
        }
        self.log(ctx, description.clone());
        self.report.failure = Some(description);

        match err {
            ScenarioError::Backend(backend) => {
                error!(scenario = %self.report.name, cycle = ctx.cycle(), error = %backend, "scenario errored");
                self.finish(ctx, ScenarioState::Errored);
                Err(backend)
            }
            other => {
                warn!(scenario = %self.report.name, cycle = ctx.cycle(), error = %other, "scenario failed");
                self.finish(ctx, ScenarioState::Failed);
                Ok(TaskPoll::Done)
            }
        }
    }
}

impl Task for ScenarioRunner {
    fn resume(&mut self, ctx: &mut SimContext) -> Result<TaskPoll, BackendError> {
        match self.report.state {
            ScenarioState::Pending => {
                info!(scenario = %self.report.name, time = %ctx.now(), "scenario started");
                self.report.state = ScenarioState::Running;
                self.report.start_time = ctx.now();
            }
            ScenarioState::Running => {}
            _ => return Ok(TaskPoll::Done),
        }
        match self.advance(ctx) {
            Ok(TaskPoll::Done) => {
                info!(scenario = %self.report.name, cycle = ctx.cycle(), time = %ctx.now(), "scenario passed");
                self.finish(ctx, ScenarioState::Passed);
                Ok(TaskPoll::Done)
            }
            Ok(poll) => Ok(poll),
            Err(err) => self.fail(ctx, err),
        }
    }
}
