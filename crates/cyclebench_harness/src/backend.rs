//! The pin-level boundary to the external simulator.
//!
//! The harness never looks inside the design under test. Everything it
//! knows comes through [`Backend`]: the pin list, pin values, and a
//! `settle` call that lets the simulator propagate pending input changes
//! up to a given instant.

use cyclebench_common::{LogicVec, SimTime};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Direction of a DUT pin as seen from the harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Driven by the harness.
    Input,
    /// Driven by the DUT.
    Output,
}

/// Static description of one DUT pin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinInfo {
    /// Pin name, e.g. `uo_out`.
    pub name: String,
    /// Bit width; immutable for the life of the backend.
    pub width: u32,
    /// Who drives the pin.
    pub direction: PinDirection,
}

impl PinInfo {
    /// Describes an input pin.
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: PinDirection::Input,
        }
    }

    /// Describes an output pin.
    pub fn output(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: PinDirection::Output,
        }
    }
}

/// A simulator exposing discrete, time-stepped pin values.
///
/// Writes are staged by the backend and take effect on the next
/// [`settle`](Backend::settle). Reads return the values produced by the most
/// recent settle, so every observation is of a fully propagated instant.
pub trait Backend {
    /// All pins of the DUT.
    fn pins(&self) -> &[PinInfo];

    /// Current value of a pin.
    fn read(&self, pin: &str) -> Result<LogicVec, BackendError>;

    /// Stages a new value on an input pin.
    fn write(&mut self, pin: &str, value: &LogicVec) -> Result<(), BackendError>;

    /// Propagates staged writes and evaluates the design at `now`.
    fn settle(&mut self, now: SimTime) -> Result<(), BackendError>;

    /// Looks up a pin by name.
    fn pin(&self, name: &str) -> Option<&PinInfo> {
        self.pins().iter().find(|p| p.name == name)
    }
}
