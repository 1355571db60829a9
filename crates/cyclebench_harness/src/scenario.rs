//! Scenarios as data: a name plus an ordered program of steps.
//!
//! Scenarios are built with a fluent builder and executed by
//! [`ScenarioRunner`](crate::runner::ScenarioRunner):
//!
//! ```ignore
//! let scenario = Scenario::new("test_reset")
//!     .start_clock("clk", Period::from_ns(40))
//!     .reset(apply_reset("clk", "rst_n", 20, "ena", ["ui_in", "uio_in"]))
//!     .wait_cycles("clk", 50)
//!     .sample("uo_out", "uo_out after reset")
//!     .assert_resolvable("uo_out", "uo_out has X or Z after reset!");
//! ```

use std::fmt;

use cyclebench_common::{Logic, LogicVec, Period};
use serde::Serialize;

use crate::reset::ResetSequence;

/// A predicate over one observed signal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Condition {
    /// Every bit is 0 or 1.
    Resolvable,
    /// The value equals this vector exactly, X and Z included.
    Equals(LogicVec),
    /// One bit has the given level.
    BitIs {
        /// Bit index, LSB = 0.
        bit: u32,
        /// Required level.
        value: Logic,
    },
    /// At least one of the listed bits is 1.
    AnyBitSet(Vec<u32>),
}

impl Condition {
    /// Evaluates the condition. Bits beyond the value's width never match.
    pub fn holds(&self, value: &LogicVec) -> bool {
        let bit = |i: u32| (i < value.width()).then(|| value.get(i));
        match self {
            Condition::Resolvable => value.is_resolvable(),
            Condition::Equals(expected) => expected == value,
            Condition::BitIs { bit: i, value: level } => bit(*i) == Some(*level),
            Condition::AnyBitSet(bits) => bits.iter().any(|&i| bit(i) == Some(Logic::One)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Resolvable => write!(f, "no X/Z bits"),
            Condition::Equals(v) => write!(f, "{v}"),
            Condition::BitIs { bit, value } => write!(f, "bit {bit} = {value}"),
            Condition::AnyBitSet(bits) => {
                let names: Vec<String> = bits.iter().map(|b| format!("bit {b}")).collect();
                write!(f, "{} set", names.join(" or "))
            }
        }
    }
}

/// How an [`Step::Observe`] condition is judged across sampled edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObserveMode {
    /// Must hold at every sampled edge; fails at the first violation.
    Always,
    /// Must hold at one or more sampled edges.
    Eventually,
}

/// One instruction of a scenario program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Step {
    /// Start a free-running clock.
    StartClock {
        /// Clock input.
        clock: String,
        /// Fixed period.
        period: Period,
    },
    /// Drive a value of exactly the signal's width.
    Set {
        /// Input signal.
        signal: String,
        /// Value to drive.
        value: LogicVec,
    },
    /// Drive an unsigned integer at the signal's width.
    SetUint {
        /// Input signal.
        signal: String,
        /// Value to drive; must fit the width.
        value: u64,
    },
    /// Drive all bits low.
    Zero {
        /// Input signal.
        signal: String,
    },
    /// Suspend until `cycles` rising edges of `clock` have passed.
    WaitCycles {
        /// Clock to count.
        clock: String,
        /// Rising edges to wait; 0 just yields.
        cycles: u64,
    },
    /// Run a reset sequence.
    Reset(ResetSequence),
    /// Fail unless every bit of `signal` is 0 or 1.
    AssertResolvable {
        /// Observed signal.
        signal: String,
        /// Failure description.
        message: String,
    },
    /// Fail unless `condition` holds for `signal` now.
    Expect {
        /// Observed signal.
        signal: String,
        /// Required condition.
        condition: Condition,
        /// Failure description.
        message: String,
    },
    /// Sample `signal` at each of the next `cycles` rising edges of `clock`.
    Observe {
        /// Clock whose rising edges are sampled.
        clock: String,
        /// Observed signal.
        signal: String,
        /// Number of rising edges sampled.
        cycles: u64,
        /// Condition checked at each sample.
        condition: Condition,
        /// How the samples are judged.
        mode: ObserveMode,
        /// Failure description.
        message: String,
    },
    /// Log and record the current value of `signal`.
    Sample {
        /// Observed signal.
        signal: String,
        /// Label for the log line.
        label: String,
    },
    /// Add a line to the scenario log.
    Log(String),
}

/// A named test scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
}

impl Scenario {
    /// Creates an empty scenario.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// The scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The program, in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Appends any step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends [`Step::StartClock`].
    pub fn start_clock(self, clock: impl Into<String>, period: Period) -> Self {
        self.step(Step::StartClock {
            clock: clock.into(),
            period,
        })
    }

    /// Appends [`Step::Set`].
    pub fn set(self, signal: impl Into<String>, value: LogicVec) -> Self {
        self.step(Step::Set {
            signal: signal.into(),
            value,
        })
    }

    /// Appends [`Step::SetUint`].
    pub fn set_u64(self, signal: impl Into<String>, value: u64) -> Self {
        self.step(Step::SetUint {
            signal: signal.into(),
            value,
        })
    }

    /// Appends [`Step::Zero`].
    pub fn zero(self, signal: impl Into<String>) -> Self {
        self.step(Step::Zero {
            signal: signal.into(),
        })
    }

    /// Appends [`Step::WaitCycles`].
    pub fn wait_cycles(self, clock: impl Into<String>, cycles: u64) -> Self {
        self.step(Step::WaitCycles {
            clock: clock.into(),
            cycles,
        })
    }

    /// Appends [`Step::Reset`].
    pub fn reset(self, sequence: ResetSequence) -> Self {
        self.step(Step::Reset(sequence))
    }

    /// Appends [`Step::AssertResolvable`].
    pub fn assert_resolvable(self, signal: impl Into<String>, message: impl Into<String>) -> Self {
        self.step(Step::AssertResolvable {
            signal: signal.into(),
            message: message.into(),
        })
    }

    /// Appends [`Step::Expect`].
    pub fn expect(
        self,
        signal: impl Into<String>,
        condition: Condition,
        message: impl Into<String>,
    ) -> Self {
        self.step(Step::Expect {
            signal: signal.into(),
            condition,
            message: message.into(),
        })
    }

    /// Appends [`Step::Observe`].
    pub fn observe(
        self,
        clock: impl Into<String>,
        signal: impl Into<String>,
        cycles: u64,
        condition: Condition,
        mode: ObserveMode,
        message: impl Into<String>,
    ) -> Self {
        self.step(Step::Observe {
            clock: clock.into(),
            signal: signal.into(),
            cycles,
            condition,
            mode,
            message: message.into(),
        })
    }

    /// Appends [`Step::Sample`].
    pub fn sample(self, signal: impl Into<String>, label: impl Into<String>) -> Self {
        self.step(Step::Sample {
            signal: signal.into(),
            label: label.into(),
        })
    }

    /// Appends [`Step::Log`].
    pub fn log(self, message: impl Into<String>) -> Self {
        self.step(Step::Log(message.into()))
    }
}

/// Lifecycle of a scenario within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioState {
    /// Registered, not yet started.
    Pending,
    /// Executing steps.
    Running,
    /// Every step completed.
    Passed,
    /// A stimulus or assertion failed.
    Failed,
    /// The backend failed underneath the scenario.
    Errored,
}

impl ScenarioState {
    /// Returns true for `Passed`, `Failed` and `Errored`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScenarioState::Passed | ScenarioState::Failed | ScenarioState::Errored
        )
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScenarioState::Pending => "PENDING",
            ScenarioState::Running => "RUNNING",
            ScenarioState::Passed => "PASS",
            ScenarioState::Failed => "FAIL",
            ScenarioState::Errored => "ERROR",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reset::apply_reset;
    use crate::testing::bits;

    #[test]
    fn builder_keeps_program_order() {
        let s = Scenario::new("ordered")
            .start_clock("clk", Period::from_ns(40))
            .reset(apply_reset("clk", "rst_n", 20, "ena", ["ui_in"]))
            .wait_cycles("clk", 50)
            .assert_resolvable("uo_out", "after reset");
        assert_eq!(s.name(), "ordered");
        assert_eq!(s.steps().len(), 4);
        assert!(matches!(s.steps()[0], Step::StartClock { .. }));
        assert!(matches!(s.steps()[1], Step::Reset(_)));
        assert!(matches!(s.steps()[3], Step::AssertResolvable { .. }));
    }

    #[test]
    fn any_bit_set_matches_sync_bits() {
        let hsync_or_vsync = Condition::AnyBitSet(vec![7, 3]);
        assert!(hsync_or_vsync.holds(&LogicVec::try_from_u64(0x80, 8).unwrap()));
        assert!(hsync_or_vsync.holds(&LogicVec::try_from_u64(0x08, 8).unwrap()));
        assert!(!hsync_or_vsync.holds(&LogicVec::try_from_u64(0x77, 8).unwrap()));
        assert!(!hsync_or_vsync.holds(&LogicVec::unknown(8)));
        assert_eq!(hsync_or_vsync.to_string(), "bit 7 or bit 3 set");
    }

    #[test]
    fn bit_is_out_of_range_never_matches() {
        let c = Condition::BitIs {
            bit: 9,
            value: Logic::Zero,
        };
        assert!(!c.holds(&LogicVec::new(8)));
    }

    #[test]
    fn equals_compares_all_four_states() {
        let v = bits("1X0Z");
        assert!(Condition::Equals(v.clone()).holds(&v));
        assert!(!Condition::Equals(bits("1X00")).holds(&v));
        assert!(!Condition::Resolvable.holds(&v));
    }

    #[test]
    fn terminal_states() {
        assert!(!ScenarioState::Pending.is_terminal());
        assert!(!ScenarioState::Running.is_terminal());
        assert!(ScenarioState::Passed.is_terminal());
        assert!(ScenarioState::Failed.is_terminal());
        assert!(ScenarioState::Errored.is_terminal());
        assert_eq!(ScenarioState::Errored.to_string(), "ERROR");
    }
}
