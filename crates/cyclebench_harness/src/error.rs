//! Error taxonomy of the harness.
//!
//! [`StimulusError`], [`ResolvabilityError`] and [`AssertionError`] are
//! scenario-local: they end the offending scenario and nothing else.
//! [`BackendError`] means the shared simulator is unusable and ends the run.
//! [`ScenarioError`] unifies the four so a scenario step can use `?`.

use std::io;

use cyclebench_common::{LogicVec, Period, SimTime};

/// A malformed or mismatched stimulus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StimulusError {
    /// The DUT has no signal with this name.
    #[error("unknown signal '{signal}'")]
    UnknownSignal {
        /// The requested signal name.
        signal: String,
    },

    /// The signal is an output of the DUT and cannot be driven.
    #[error("signal '{signal}' is not an input")]
    NotAnInput {
        /// The signal name.
        signal: String,
    },

    /// The value's width differs from the signal's width.
    #[error("width mismatch on '{signal}': signal is {expected} bits, value is {actual} bits")]
    WidthMismatch {
        /// The signal name.
        signal: String,
        /// The signal's width.
        expected: u32,
        /// The width of the value written.
        actual: u32,
    },

    /// An integer value has set bits beyond the signal's width.
    #[error("value {value:#x} does not fit in {width}-bit signal '{signal}'")]
    ValueOutOfRange {
        /// The signal name.
        signal: String,
        /// The integer written.
        value: u64,
        /// The signal's width.
        width: u32,
    },

    /// A clock was requested on a signal wider than one bit.
    #[error("clock signal '{signal}' must be 1 bit wide, found {width} bits")]
    NotAClock {
        /// The signal name.
        signal: String,
        /// The signal's width.
        width: u32,
    },

    /// The clock period cannot be split into two equal half-periods.
    #[error("clock period {period} on '{signal}' must be a non-zero even number of femtoseconds")]
    InvalidPeriod {
        /// The clock signal name.
        signal: String,
        /// The rejected period.
        period: Period,
    },

    /// A cycle wait names a clock that was never started.
    #[error("cannot wait on clock '{clock}': it is not running")]
    ClockNotRunning {
        /// The clock signal name.
        clock: String,
    },
}

/// An unknown or high-impedance bit where a defined value was required.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}: '{signal}' = {observed} has X/Z on bits {unresolved:?} at cycle {cycle} ({time})")]
pub struct ResolvabilityError {
    /// The checked signal.
    pub signal: String,
    /// The value observed.
    pub observed: LogicVec,
    /// Indices of the X/Z bits, LSB first.
    pub unresolved: Vec<u32>,
    /// Rising edges of the scenario clock at the time of the check.
    pub cycle: u64,
    /// Simulated time of the check.
    pub time: SimTime,
    /// Caller-supplied description.
    pub message: String,
}

/// An expected logical condition evaluated false.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}: '{signal}' expected {expected}, observed {observed} at cycle {cycle} ({time})")]
pub struct AssertionError {
    /// The checked signal.
    pub signal: String,
    /// Description of the expected condition.
    pub expected: String,
    /// The value observed.
    pub observed: LogicVec,
    /// Rising edges of the scenario clock at the time of the check.
    pub cycle: u64,
    /// Simulated time of the check.
    pub time: SimTime,
    /// Caller-supplied description.
    pub message: String,
}

/// The simulator behind the pin interface failed.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend does not know the pin.
    #[error("backend has no pin '{pin}'")]
    UnknownPin {
        /// The pin name.
        pin: String,
    },

    /// A write targeted an output pin.
    #[error("backend pin '{pin}' is read-only")]
    ReadOnlyPin {
        /// The pin name.
        pin: String,
    },

    /// A write had the wrong width for the pin.
    #[error("backend rejected a {actual}-bit value for {expected}-bit pin '{pin}'")]
    WidthMismatch {
        /// The pin name.
        pin: String,
        /// The pin's width.
        expected: u32,
        /// The width written.
        actual: u32,
    },

    /// The simulator itself crashed or stopped responding.
    #[error("simulator fault at {time}: {reason}")]
    Fault {
        /// Simulated time of the fault.
        time: SimTime,
        /// Backend-supplied description.
        reason: String,
    },

    /// Writing the waveform trace failed.
    #[error("trace I/O error: {0}")]
    TraceIo(#[from] io::Error),
}

/// Any error a scenario step can raise.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// See [`StimulusError`].
    #[error("stimulus error: {0}")]
    Stimulus(#[from] StimulusError),

    /// See [`ResolvabilityError`].
    #[error("resolvability error: {0}")]
    Resolvability(#[from] ResolvabilityError),

    /// See [`AssertionError`].
    #[error("assertion error: {0}")]
    Assertion(#[from] AssertionError),

    /// See [`BackendError`].
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ScenarioError {
    /// Returns true if the error makes the shared clock/DUT unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScenarioError::Backend(_))
    }
}

/// Errors raised while registering scenarios.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// Two scenarios share a name.
    #[error("scenario '{0}' is already registered")]
    DuplicateScenario(String),
}
