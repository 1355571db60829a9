//! Four-state logic values as observed on DUT pins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single 4-state logic value.
///
/// Only [`Logic::Zero`] and [`Logic::One`] are *resolvable*; the other two
/// states mean the harness cannot tell what the hardware would actually do.
/// - `Zero`: driven low
/// - `One`: driven high
/// - `X`: unknown (uninitialized register, conflicting drivers)
/// - `Z`: high-impedance (nothing is driving the net)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    #[default]
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown.
    X = 2,
    /// High-impedance.
    Z = 3,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Maps a boolean onto a driven level.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Returns the boolean level, or `None` for X and Z.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logic::Zero => Some(false),
            Logic::One => Some(true),
            Logic::X | Logic::Z => None,
        }
    }

    /// Returns true if the value is definitively 0 or 1.
    pub fn is_resolvable(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    /// Decodes the 2-bit packed representation used by [`LogicVec`](crate::LogicVec).
    pub(crate) fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Character used by both `Display` and waveform dumps.
    pub fn as_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'X',
            Logic::Z => 'Z',
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
