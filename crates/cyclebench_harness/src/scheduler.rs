//! Sequential execution of registered scenarios.
//!
//! Scenarios run one at a time, in registration order, against one shared
//! [`SimContext`]. Clocks are stopped between scenarios so each one starts
//! its own, and writes a scenario issued but never reached a checkpoint with
//! are discarded. Simulated time keeps advancing across the whole run. A failed
//! scenario does not affect its siblings. A [`BackendError`] marks the
//! running scenario `Errored` and leaves every later scenario `Pending`.
//!
//! [`BackendError`]: crate::error::BackendError

use tracing::{error, info, warn};

use crate::context::SimContext;
use crate::error::SchedulerError;
use crate::kernel;
use crate::report::{RunReport, ScenarioReport};
use crate::runner::ScenarioRunner;
use crate::scenario::Scenario;

/// Registry and sequential runner of scenarios.
#[derive(Debug, Default)]
pub struct ScenarioScheduler {
    scenarios: Vec<Scenario>,
    filter: Option<String>,
}

impl ScenarioScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scenario. Names must be unique.
    pub fn register(&mut self, scenario: Scenario) -> Result<(), SchedulerError> {
        if self.scenarios.iter().any(|s| s.name() == scenario.name()) {
            return Err(SchedulerError::DuplicateScenario(scenario.name().to_string()));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Restricts the next runs to scenarios whose name contains `filter`.
    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
    }

    /// Registered scenario names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(Scenario::name).collect()
    }

    /// Number of registered scenarios.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    fn selected(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter().filter(|s| match &self.filter {
            Some(f) => s.name().contains(f.as_str()),
            None => true,
        })
    }

    /// Runs every selected scenario and collects their verdicts.
    pub fn run(&self, ctx: &mut SimContext) -> RunReport {
        let mut reports = Vec::new();
        let mut aborted: Option<String> = None;

        for scenario in self.selected() {
            if aborted.is_some() {
                reports.push(ScenarioReport::pending(scenario.name()));
                continue;
            }
            let mut runner = ScenarioRunner::new(scenario);
            let outcome = kernel::run(ctx, &mut [&mut runner]);
            if let Err(err) = outcome {
                let reason = err.to_string();
                error!(scenario = %runner.name(), error = %reason, "backend failure, aborting run");
                runner.abort(ctx, &reason);
                aborted = Some(format!("scenario '{}': {reason}", runner.name()));
            }
            ctx.stop_clocks();
            let dropped = ctx.discard_pending();
            if dropped > 0 {
                warn!(scenario = %runner.name(), dropped, "unapplied writes discarded");
            }
            let report = runner.into_report();
            info!(
                scenario = %report.name,
                state = %report.state,
                cycles = report.cycles,
                "scenario finished"
            );
            reports.push(report);
        }

        if let Err(err) = ctx.finish_trace() {
            warn!(error = %err, "failed to finalize trace");
            aborted.get_or_insert_with(|| err.to_string());
        }

        let run = RunReport {
            scenarios: reports,
            aborted,
            final_time: ctx.now(),
        };
        let summary = run.summary();
        info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            pending = summary.pending,
            "run complete"
        );
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reset::apply_reset;
    use crate::scenario::ScenarioState;
    use crate::testing::LatchDut;
    use cyclebench_common::{LogicVec, Period, SimTime};

    fn healthy(name: &str) -> Scenario {
        Scenario::new(name)
            .start_clock("clk", Period::from_ns(40))
            .reset(apply_reset("clk", "rst_n", 20, "ena", ["d"]))
            .wait_cycles("clk", 50)
            .assert_resolvable("q", "q has X or Z after reset!")
    }

    fn broken(name: &str) -> Scenario {
        Scenario::new(name)
            .start_clock("clk", Period::from_ns(40))
            .set("d", LogicVec::new(2))
            .log("unreachable")
    }

    /// Resets with a single edge, so a lost first edge leaves `q` unknown.
    fn one_edge_reset(name: &str) -> Scenario {
        Scenario::new(name)
            .start_clock("clk", Period::from_ns(40))
            .reset(apply_reset("clk", "rst_n", 1, "ena", ["d"]))
            .wait_cycles("clk", 0)
            .assert_resolvable("q", "q has X or Z after reset!")
    }

    /// Ends on a rising edge with `q` holding X.
    fn ends_high_with_unknown_q(name: &str) -> Scenario {
        Scenario::new(name)
            .start_clock("clk", Period::from_ns(40))
            .reset(apply_reset("clk", "rst_n", 2, "ena", ["d"]))
            .set("d", LogicVec::unknown(4))
            .wait_cycles("clk", 1)
    }

    fn run_all(scenarios: Vec<Scenario>) -> RunReport {
        let mut sched = ScenarioScheduler::new();
        for s in scenarios {
            sched.register(s).unwrap();
        }
        sched.run(&mut SimContext::new(Box::new(LatchDut::new())))
    }

    #[test]
    fn verdict_does_not_depend_on_previous_scenario() {
        let alone = run_all(vec![one_edge_reset("b")]);
        assert_eq!(alone.scenarios[0].state, ScenarioState::Passed);

        let after = run_all(vec![ends_high_with_unknown_q("a"), one_edge_reset("b")]);
        assert_eq!(after.scenario("a").unwrap().state, ScenarioState::Passed);
        assert_eq!(
            after.scenario("b").unwrap().state,
            alone.scenarios[0].state,
            "{:?}",
            after.scenario("b").unwrap().failure
        );
    }

    #[test]
    fn unapplied_writes_do_not_leak_into_next_scenario() {
        let leaving = healthy("a").set_u64("d", 7);
        let reader = Scenario::new("b")
            .start_clock("clk", Period::from_ns(40))
            .wait_cycles("clk", 0)
            .sample("d", "d at start");
        let run = run_all(vec![leaving, reader]);
        assert!(run.passed(), "{run:?}");
        let b = run.scenario("b").unwrap();
        assert_eq!(b.samples[0].value.to_u64(), Some(0));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut sched = ScenarioScheduler::new();
        sched.register(healthy("a")).unwrap();
        assert_eq!(
            sched.register(healthy("a")),
            Err(SchedulerError::DuplicateScenario("a".into()))
        );
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn failure_does_not_stop_siblings() {
        let mut sched = ScenarioScheduler::new();
        sched.register(healthy("first")).unwrap();
        sched.register(broken("second")).unwrap();
        sched.register(healthy("third")).unwrap();
        let mut ctx = SimContext::new(Box::new(LatchDut::new()));
        let run = sched.run(&mut ctx);

        let states: Vec<_> = run.scenarios.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![ScenarioState::Passed, ScenarioState::Failed, ScenarioState::Passed]
        );
        assert!(!run.passed());
        assert!(run.aborted.is_none());
        // each scenario restarts its clock, so cycle counts are per scenario
        assert_eq!(run.scenario("third").unwrap().cycles, 70);
    }

    #[test]
    fn time_is_monotonic_across_scenarios() {
        let mut sched = ScenarioScheduler::new();
        sched.register(healthy("a")).unwrap();
        sched.register(healthy("b")).unwrap();
        let mut ctx = SimContext::new(Box::new(LatchDut::new()));
        let run = sched.run(&mut ctx);
        let a = run.scenario("a").unwrap();
        let b = run.scenario("b").unwrap();
        assert!(a.end_time <= b.start_time);
        assert!(b.end_time > b.start_time);
        assert_eq!(run.final_time, b.end_time);
        assert!(run.passed());
    }

    #[test]
    fn backend_error_aborts_remaining_scenarios() {
        let mut dut = LatchDut::new();
        dut.fail_after_settles = Some(30);
        let mut sched = ScenarioScheduler::new();
        sched.register(healthy("crash")).unwrap();
        sched.register(healthy("after")).unwrap();
        let mut ctx = SimContext::new(Box::new(dut));
        let run = sched.run(&mut ctx);

        assert_eq!(run.scenarios[0].state, ScenarioState::Errored);
        assert_eq!(run.scenarios[1].state, ScenarioState::Pending);
        assert!(run.aborted.as_deref().unwrap().contains("crash"));
        assert!(!run.passed());
    }

    #[test]
    fn filter_selects_by_substring() {
        let mut sched = ScenarioScheduler::new();
        sched.register(healthy("test_reset")).unwrap();
        sched.register(healthy("test_double_reset")).unwrap();
        sched.register(healthy("test_vga_sync")).unwrap();
        sched.set_filter(Some("reset".into()));
        let mut ctx = SimContext::new(Box::new(LatchDut::new()));
        let run = sched.run(&mut ctx);
        let names: Vec<_> = run.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["test_reset", "test_double_reset"]);
    }

    #[test]
    fn empty_scheduler_passes() {
        let sched = ScenarioScheduler::new();
        assert!(sched.is_empty());
        let mut ctx = SimContext::new(Box::new(LatchDut::new()));
        let run = sched.run(&mut ctx);
        assert!(run.passed());
        assert_eq!(run.final_time, SimTime::ZERO);
    }
}
