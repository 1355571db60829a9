//! Shared foundational types for the cyclebench stimulus/response harness.
//!
//! This crate provides the 4-state logic value ([`Logic`]), packed logic
//! vectors used for every pin value ([`LogicVec`]), and the simulated time
//! types ([`SimTime`], [`Period`]) that all waits and clocks are expressed in.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;
pub mod time;

pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use time::{ParsePeriodError, Period, SimTime};
