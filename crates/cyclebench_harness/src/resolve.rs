//! Structural health check: every bit of a signal must be 0 or 1.
//!
//! This never looks at what the value *means*, only whether the simulator
//! could determine it.

use cyclebench_common::LogicVec;

use crate::context::SimContext;
use crate::error::{ResolvabilityError, ScenarioError};

/// Reads `signal` and fails with [`ResolvabilityError`] if any bit is X or Z.
///
/// Returns the observed value on success.
pub fn assert_resolvable(
    ctx: &SimContext,
    signal: &str,
    message: &str,
) -> Result<LogicVec, ScenarioError> {
    let value = ctx.observe(signal)?;
    check(ctx, signal, &value, message)?;
    Ok(value)
}

/// Checks an already-observed value of `signal`.
pub fn check(
    ctx: &SimContext,
    signal: &str,
    value: &LogicVec,
    message: &str,
) -> Result<(), ResolvabilityError> {
    let unresolved = value.unresolved_bits();
    if unresolved.is_empty() {
        return Ok(());
    }
    Err(ResolvabilityError {
        signal: signal.to_string(),
        observed: value.clone(),
        unresolved,
        cycle: ctx.cycle(),
        time: ctx.now(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LatchDut;
    use crate::{clock, driver};
    use cyclebench_common::Period;

    #[test]
    fn unreset_register_is_unresolvable() {
        let ctx = SimContext::new(Box::new(LatchDut::new()));
        let err = assert_resolvable(&ctx, "q", "q has X or Z").unwrap_err();
        let ScenarioError::Resolvability(err) = err else {
            panic!("expected resolvability error, got {err:?}");
        };
        assert_eq!(err.unresolved, vec![0, 1, 2, 3]);
        assert_eq!(err.cycle, 0);
        assert_eq!(err.message, "q has X or Z");
    }

    #[test]
    fn high_impedance_is_unresolvable() {
        let ctx = SimContext::new(Box::new(LatchDut::new()));
        assert!(matches!(
            assert_resolvable(&ctx, "hiz", "floating"),
            Err(ScenarioError::Resolvability(_))
        ));
    }

    #[test]
    fn reset_register_is_resolvable() {
        let mut ctx = SimContext::new(Box::new(LatchDut::new()));
        clock::start(&mut ctx, "clk", Period::from_ns(10)).unwrap();
        driver::set_u64(&mut ctx, "rst_n", 0).unwrap();
        ctx.deliver_next().unwrap();
        let value = assert_resolvable(&ctx, "q", "q after reset").unwrap();
        assert_eq!(value.to_u64(), Some(0));
    }

    #[test]
    fn unknown_signal_is_stimulus_error() {
        let ctx = SimContext::new(Box::new(LatchDut::new()));
        assert!(matches!(
            assert_resolvable(&ctx, "uo_out", "missing"),
            Err(ScenarioError::Stimulus(_))
        ));
    }
}
