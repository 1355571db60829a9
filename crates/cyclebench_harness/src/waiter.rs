//! Suspension targets expressed in clock cycles.

use serde::Serialize;

use crate::context::SimContext;
use crate::error::StimulusError;

/// What a suspended task is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WaitTarget {
    /// Resume after one checkpoint at the current instant.
    Yield,
    /// Resume once `clock` has delivered `edges` rising edges in total.
    Edges {
        /// The clock signal.
        clock: String,
        /// Absolute rising-edge count to reach.
        edges: u64,
    },
}

impl WaitTarget {
    /// Returns true if the target has been reached.
    pub fn is_satisfied(&self, ctx: &SimContext) -> bool {
        match self {
            WaitTarget::Yield => true,
            WaitTarget::Edges { clock, edges } => {
                ctx.rising_edges(clock).is_some_and(|seen| seen >= *edges)
            }
        }
    }
}

/// Computes the target for waiting `n` rising edges of `clock` from now.
///
/// `n = 0` is a plain yield: the caller is resumed after pending writes
/// have settled, without time advancing.
pub fn wait_cycles(ctx: &SimContext, clock: &str, n: u64) -> Result<WaitTarget, StimulusError> {
    if n == 0 {
        return Ok(WaitTarget::Yield);
    }
    let seen = ctx
        .rising_edges(clock)
        .ok_or_else(|| StimulusError::ClockNotRunning {
            clock: clock.to_string(),
        })?;
    Ok(WaitTarget::Edges {
        clock: clock.to_string(),
        edges: seen + n,
    })
}
