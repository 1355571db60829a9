//! Reference design under test for the cyclebench harness.
//!
//! [`VgaShooter`] models the pins of a small VGA shooter game closely enough
//! to exercise every harness path: registers that are unknown until reset,
//! an enable that freezes state, free-running 640x480 sync timing, and
//! button inputs that move a shooter and fire a bullet. [`FaultInjector`]
//! wraps any backend and makes it crash on demand.

#![warn(missing_docs)]

pub mod fault;
pub mod shooter;
pub mod timing;

pub use fault::FaultInjector;
pub use shooter::{GameState, VgaShooter};
pub use timing::VgaTiming;
