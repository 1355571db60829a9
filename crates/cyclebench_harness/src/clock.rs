//! Free-running clock generation.

use cyclebench_common::Period;
use tracing::info;

use crate::context::SimContext;
use crate::driver::input_width;
use crate::error::{ScenarioError, StimulusError};

/// Starts a free-running clock on `signal`.
///
/// The pin is driven low and the backend settled at the call instant; the
/// first transition, a rising edge, happens half a period later. The clock then
/// toggles every half-period until [`SimContext::stop_clocks`]. Starting a
/// clock that is already running is not detected.
pub fn start(ctx: &mut SimContext, signal: &str, period: Period) -> Result<(), ScenarioError> {
    let width = input_width(ctx, signal)?;
    if width != 1 {
        return Err(StimulusError::NotAClock {
            signal: signal.to_string(),
            width,
        }
        .into());
    }
    if !period.is_valid() {
        return Err(StimulusError::InvalidPeriod {
            signal: signal.to_string(),
            period,
        }
        .into());
    }
    info!(signal, %period, time = %ctx.now(), "clock started");
    ctx.add_clock(signal, period)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LatchDut;
    use cyclebench_common::SimTime;

    fn ctx() -> SimContext {
        SimContext::new(Box::new(LatchDut::new()))
    }

    #[test]
    fn first_rising_edge_after_half_period() {
        let mut ctx = ctx();
        start(&mut ctx, "clk", Period::from_ns(40)).unwrap();
        ctx.deliver_next().unwrap();
        assert_eq!(ctx.now(), SimTime::from_ns(20));
        assert_eq!(ctx.rising_edges("clk"), Some(1));
    }

    #[test]
    fn period_is_strictly_periodic() {
        let mut ctx = ctx();
        start(&mut ctx, "clk", Period::from_us(1)).unwrap();
        let mut rising_times = Vec::new();
        for _ in 0..10 {
            ctx.deliver_next().unwrap();
            if ctx.observe("clk").unwrap().to_u64() == Some(1) {
                rising_times.push(ctx.now().fs);
            }
        }
        assert_eq!(rising_times.len(), 5);
        for pair in rising_times.windows(2) {
            assert_eq!(pair[1] - pair[0], Period::from_us(1).as_fs());
        }
    }

    #[test]
    fn rejects_wide_signal() {
        let mut ctx = ctx();
        let err = start(&mut ctx, "d", Period::from_ns(10)).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Stimulus(StimulusError::NotAClock { width: 4, .. })
        ));
    }

    #[test]
    fn rejects_odd_period() {
        let mut ctx = ctx();
        let err = start(&mut ctx, "clk", Period::from_fs(7)).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Stimulus(StimulusError::InvalidPeriod { .. })
        ));
        assert!(!ctx.has_running_clock());
    }

    #[test]
    fn rejects_output_pin() {
        let mut ctx = ctx();
        let err = start(&mut ctx, "q", Period::from_ns(10)).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Stimulus(StimulusError::NotAnInput { .. })
        ));
    }
}
