//! Packed vectors of 4-state logic values, one per pin bit.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

/// A fixed-width vector of [`Logic`] values.
///
/// Each value occupies 2 bits, 32 values per `u64` word. Index 0 is the
/// least significant bit, matching how `uo_out[0]` is addressed on the DUT.
/// The width never changes after construction.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    data: Vec<u64>,
}

impl LogicVec {
    /// Creates a vector of the given width with every bit `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; width.div_ceil(VALUES_PER_WORD) as usize],
        }
    }

    /// Creates a vector with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        let mut v = Self::new(width);
        if value != Logic::Zero {
            for i in 0..width {
                v.set(i, value);
            }
        }
        v
    }

    /// Creates an all-`X` vector, the state of a register nobody has reset.
    pub fn unknown(width: u32) -> Self {
        Self::filled(width, Logic::X)
    }

    /// Creates a single-bit vector from a boolean.
    pub fn from_bool(value: bool) -> Self {
        Self::filled(1, Logic::from_bool(value))
    }

    /// Creates a vector from an unsigned integer.
    ///
    /// Returns `None` if `value` has a set bit at or above `width`; values
    /// are never silently truncated.
    pub fn try_from_u64(value: u64, width: u32) -> Option<Self> {
        if width < 64 && value >> width != 0 {
            return None;
        }
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        Some(v)
    }

    /// Returns the number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the value of bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "bit {index} out of range for width {}",
            self.width
        );
        let (word, shift) = locate(index);
        Logic::from_bits(self.data[word] >> shift)
    }

    /// Sets bit `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "bit {index} out of range for width {}",
            self.width
        );
        let (word, shift) = locate(index);
        self.data[word] = (self.data[word] & !(0b11 << shift)) | ((value as u64) << shift);
    }

    /// Iterates bits from LSB to MSB.
    pub fn iter(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).map(|i| self.get(i))
    }

    /// Returns true if every bit is 0 or 1.
    pub fn is_resolvable(&self) -> bool {
        self.iter().all(Logic::is_resolvable)
    }

    /// Indices of the bits that are X or Z, LSB first.
    pub fn unresolved_bits(&self) -> Vec<u32> {
        self.iter()
            .enumerate()
            .filter(|(_, b)| !b.is_resolvable())
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Converts to an integer if every bit is resolvable and the width fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        self.iter().enumerate().try_fold(0u64, |acc, (i, b)| {
            b.to_bool().map(|set| acc | (u64::from(set) << i))
        })
    }
}

/// Word index and bit shift of a logic value inside the packed storage.
fn locate(index: u32) -> (usize, u32) {
    (
        (index / VALUES_PER_WORD) as usize,
        (index % VALUES_PER_WORD) * 2,
    )
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}
