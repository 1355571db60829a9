//! Width-checked writes to DUT inputs.
//!
//! A write is queued on the [`SimContext`] and reaches the backend at the
//! next checkpoint, so nothing observes a half-applied set of writes.

use cyclebench_common::LogicVec;
use tracing::debug;

use crate::backend::PinDirection;
use crate::context::SimContext;
use crate::error::StimulusError;

/// Returns the width of input `signal`, rejecting unknown names and outputs.
pub(crate) fn input_width(ctx: &SimContext, signal: &str) -> Result<u32, StimulusError> {
    let pin = ctx
        .pin(signal)
        .ok_or_else(|| StimulusError::UnknownSignal {
            signal: signal.to_string(),
        })?;
    if pin.direction != PinDirection::Input {
        return Err(StimulusError::NotAnInput {
            signal: signal.to_string(),
        });
    }
    Ok(pin.width)
}

/// Drives `value` onto input `signal`.
///
/// The value's width must equal the signal's width; nothing is truncated or
/// extended.
pub fn set(ctx: &mut SimContext, signal: &str, value: LogicVec) -> Result<(), StimulusError> {
    let width = input_width(ctx, signal)?;
    if value.width() != width {
        return Err(StimulusError::WidthMismatch {
            signal: signal.to_string(),
            expected: width,
            actual: value.width(),
        });
    }
    debug!(signal, %value, cycle = ctx.cycle(), "set");
    ctx.queue_write(signal, value);
    Ok(())
}

/// Drives an unsigned integer onto `signal` at the signal's own width.
///
/// Fails if `value` needs more bits than the signal has.
pub fn set_u64(ctx: &mut SimContext, signal: &str, value: u64) -> Result<(), StimulusError> {
    let width = input_width(ctx, signal)?;
    let bits =
        LogicVec::try_from_u64(value, width).ok_or_else(|| StimulusError::ValueOutOfRange {
            signal: signal.to_string(),
            value,
            width,
        })?;
    set(ctx, signal, bits)
}

/// Drives every bit of `signal` to 0.
pub fn zero(ctx: &mut SimContext, signal: &str) -> Result<(), StimulusError> {
    let width = input_width(ctx, signal)?;
    set(ctx, signal, LogicVec::new(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LatchDut;

    fn ctx() -> SimContext {
        SimContext::new(Box::new(LatchDut::new()))
    }

    #[test]
    fn set_exact_width_is_queued() {
        let mut ctx = ctx();
        set(&mut ctx, "d", LogicVec::try_from_u64(3, 4).unwrap()).unwrap();
        assert_eq!(ctx.pending_writes(), 1);
        // not visible before the checkpoint
        assert!(!ctx.observe("d").unwrap().is_resolvable());
        ctx.checkpoint().unwrap();
        assert_eq!(ctx.observe("d").unwrap().to_u64(), Some(3));
    }

    #[test]
    fn set_rejects_width_mismatch() {
        let mut ctx = ctx();
        let err = set(&mut ctx, "d", LogicVec::new(8)).unwrap_err();
        assert_eq!(
            err,
            StimulusError::WidthMismatch {
                signal: "d".into(),
                expected: 4,
                actual: 8
            }
        );
        assert_eq!(ctx.pending_writes(), 0);
    }

    #[test]
    fn set_rejects_unknown_and_output_signals() {
        let mut ctx = ctx();
        assert!(matches!(
            set(&mut ctx, "nope", LogicVec::new(1)),
            Err(StimulusError::UnknownSignal { .. })
        ));
        assert!(matches!(
            set(&mut ctx, "q", LogicVec::new(4)),
            Err(StimulusError::NotAnInput { .. })
        ));
    }

    #[test]
    fn set_u64_checks_range() {
        let mut ctx = ctx();
        set_u64(&mut ctx, "d", 0b1111).unwrap();
        let err = set_u64(&mut ctx, "d", 0b1_0000).unwrap_err();
        assert!(matches!(
            err,
            StimulusError::ValueOutOfRange { width: 4, .. }
        ));
    }

    #[test]
    fn zero_uses_signal_width() {
        let mut ctx = ctx();
        zero(&mut ctx, "d").unwrap();
        ctx.checkpoint().unwrap();
        assert_eq!(ctx.observe("d").unwrap().to_string(), "0000");
    }

    #[test]
    fn later_write_wins_at_checkpoint() {
        let mut ctx = ctx();
        set_u64(&mut ctx, "d", 1).unwrap();
        set_u64(&mut ctx, "d", 2).unwrap();
        ctx.checkpoint().unwrap();
        assert_eq!(ctx.observe("d").unwrap().to_u64(), Some(2));
    }
}
