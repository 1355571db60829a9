//! Reset sequencing.
//!
//! A reset is expressed as a short program of primitive steps so that it
//! suspends and resumes exactly like the rest of its scenario:
//! enable on, other inputs zeroed, reset asserted, `assert_cycles` rising
//! edges, reset released. No settle window is applied after release;
//! scenarios add their own.

use serde::Serialize;

use crate::scenario::Step;

/// Parameters of one reset pulse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetSequence {
    /// Clock whose rising edges time the pulse.
    pub clock: String,
    /// The reset input.
    pub reset: String,
    /// Rising edges the reset is held asserted.
    pub assert_cycles: u64,
    /// Enable input, driven active before reset.
    pub enable: String,
    /// Inputs driven to 0 before reset.
    pub other_inputs: Vec<String>,
    /// Reset is asserted by driving 0.
    pub active_low: bool,
}

/// Builds an active-low reset sequence.
pub fn apply_reset(
    clock: impl Into<String>,
    reset_signal: impl Into<String>,
    assert_cycles: u64,
    enable_signal: impl Into<String>,
    other_inputs: impl IntoIterator<Item = impl Into<String>>,
) -> ResetSequence {
    ResetSequence {
        clock: clock.into(),
        reset: reset_signal.into(),
        assert_cycles,
        enable: enable_signal.into(),
        other_inputs: other_inputs.into_iter().map(Into::into).collect(),
        active_low: true,
    }
}

impl ResetSequence {
    /// Makes the reset active-high.
    pub fn active_high(mut self) -> Self {
        self.active_low = false;
        self
    }

    /// The primitive steps of this reset, in execution order.
    pub fn steps(&self) -> Vec<Step> {
        let asserted = u64::from(!self.active_low);
        let mut steps = vec![Step::SetUint {
            signal: self.enable.clone(),
            value: 1,
        }];
        steps.extend(self.other_inputs.iter().map(|signal| Step::Zero {
            signal: signal.clone(),
        }));
        steps.push(Step::SetUint {
            signal: self.reset.clone(),
            value: asserted,
        });
        steps.push(Step::WaitCycles {
            clock: self.clock.clone(),
            cycles: self.assert_cycles,
        });
        steps.push(Step::SetUint {
            signal: self.reset.clone(),
            value: 1 - asserted,
        });
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_program() {
        let seq = apply_reset("clk", "rst_n", 20, "ena", ["ui_in", "uio_in"]);
        assert_eq!(
            seq.steps(),
            vec![
                Step::SetUint {
                    signal: "ena".into(),
                    value: 1
                },
                Step::Zero {
                    signal: "ui_in".into()
                },
                Step::Zero {
                    signal: "uio_in".into()
                },
                Step::SetUint {
                    signal: "rst_n".into(),
                    value: 0
                },
                Step::WaitCycles {
                    clock: "clk".into(),
                    cycles: 20
                },
                Step::SetUint {
                    signal: "rst_n".into(),
                    value: 1
                },
            ]
        );
    }

    #[test]
    fn active_high_inverts_levels() {
        let seq = apply_reset("clk", "rst", 3, "ena", Vec::<String>::new()).active_high();
        let steps = seq.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(
            steps[1],
            Step::SetUint {
                signal: "rst".into(),
                value: 1
            }
        );
        assert_eq!(
            steps[3],
            Step::SetUint {
                signal: "rst".into(),
                value: 0
            }
        );
    }
}
