//! Simulated time with femtosecond resolution, and clock periods.
//!
//! [`SimTime`] is an absolute instant on the one shared simulated timeline.
//! [`Period`] is a clock period; it parses from strings such as `"40ns"` or
//! `"1 us"` so that configuration files can state periods in natural units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;

/// Display units, largest first.
const UNITS: [(u64, &str); 4] = [
    (FS_PER_MS, "ms"),
    (FS_PER_US, "us"),
    (FS_PER_NS, "ns"),
    (FS_PER_PS, "ps"),
];

/// Formats a femtosecond count with the largest unit that divides it exactly.
fn write_fs(f: &mut fmt::Formatter<'_>, fs: u64) -> fmt::Result {
    if fs == 0 {
        return write!(f, "0 fs");
    }
    for (scale, unit) in UNITS {
        if fs >= scale && fs % scale == 0 {
            return write!(f, "{} {unit}", fs / scale);
        }
    }
    write!(f, "{fs} fs")
}

/// An instant on the simulated timeline.
///
/// Time only moves forward; the harness advances it exclusively by
/// delivering clock events.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime {
    /// Femtoseconds since the start of the run.
    pub fs: u64,
}

impl SimTime {
    /// The start of the run.
    pub const ZERO: SimTime = SimTime { fs: 0 };

    /// Creates a time from femtoseconds.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from nanoseconds.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a time from microseconds.
    pub fn from_us(us: u64) -> Self {
        Self { fs: us * FS_PER_US }
    }

    /// Converts to nanoseconds (truncated).
    pub fn to_ns(self) -> u64 {
        self.fs / FS_PER_NS
    }
}

impl Add<u64> for SimTime {
    type Output = SimTime;

    fn add(self, fs: u64) -> SimTime {
        SimTime { fs: self.fs + fs }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fs(f, self.fs)
    }
}

/// A clock period.
///
/// A period is fixed for the lifetime of a clock; it must be non-zero and an
/// even number of femtoseconds so that both half-periods are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    fs: u64,
}

impl Period {
    /// Creates a period from femtoseconds.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a period from nanoseconds.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a period from microseconds.
    pub fn from_us(us: u64) -> Self {
        Self { fs: us * FS_PER_US }
    }

    /// Returns the period in femtoseconds.
    pub fn as_fs(self) -> u64 {
        self.fs
    }

    /// Returns the half-period, the spacing between clock toggles.
    pub fn half(self) -> u64 {
        self.fs / 2
    }

    /// Returns true if the period can drive a clock with equal half-periods.
    pub fn is_valid(self) -> bool {
        self.fs >= 2 && self.fs % 2 == 0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fs(f, self.fs)
    }
}

/// Error type for parsing period strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid clock period: '{}'", self.input)
    }
}

impl std::error::Error for ParsePeriodError {}

impl FromStr for Period {
    type Err = ParsePeriodError;

    /// Parses `"<integer><unit>"` where unit is one of `fs`, `ps`, `ns`,
    /// `us`, `ms` (case-insensitive, optional whitespace before the unit).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParsePeriodError {
            input: s.to_string(),
        };
        let lower = s.to_ascii_lowercase();
        let split = lower
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(err)?;
        let (num, unit) = lower.split_at(split);
        let value: u64 = num.parse().map_err(|_| err())?;
        let scale = match unit.trim() {
            "fs" => 1,
            "ps" => FS_PER_PS,
            "ns" => FS_PER_NS,
            "us" => FS_PER_US,
            "ms" => FS_PER_MS,
            _ => return Err(err()),
        };
        value
            .checked_mul(scale)
            .map(Period::from_fs)
            .ok_or_else(err)
    }
}
