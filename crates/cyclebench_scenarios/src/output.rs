//! Decoding of the packed `uo_out` bus.
//!
//! `uo_out = {hsync, B0, G0, R0, vsync, B1, G1, R1}`, MSB first.

use std::fmt;

use cyclebench_common::LogicVec;

/// Bit index of HSYNC in `uo_out`.
pub const HSYNC_BIT: u32 = 7;
/// Bit index of VSYNC in `uo_out`.
pub const VSYNC_BIT: u32 = 3;

/// One 3-bit color sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    /// Red.
    pub r: bool,
    /// Green.
    pub g: bool,
    /// Blue.
    pub b: bool,
}

impl Rgb {
    fn from_bits(bits: u64) -> Self {
        Self {
            r: bits & 1 == 1,
            g: bits & 2 == 2,
            b: bits & 4 == 4,
        }
    }
}

/// A fully resolved `uo_out` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VgaOutput {
    /// Horizontal sync.
    pub hsync: bool,
    /// Vertical sync.
    pub vsync: bool,
    /// Color sample in bits 6..4.
    pub plane0: Rgb,
    /// Color sample in bits 2..0.
    pub plane1: Rgb,
    raw: u8,
}

impl VgaOutput {
    /// Decodes an 8-bit `uo_out` value. Returns `None` for any other width
    /// or if a bit is X or Z.
    pub fn decode(value: &LogicVec) -> Option<Self> {
        if value.width() != 8 {
            return None;
        }
        let bits = value.to_u64()?;
        Some(Self {
            hsync: (bits >> HSYNC_BIT) & 1 == 1,
            vsync: (bits >> VSYNC_BIT) & 1 == 1,
            plane0: Rgb::from_bits(bits >> 4),
            plane1: Rgb::from_bits(bits),
            raw: bits as u8,
        })
    }

    /// The packed byte.
    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Returns true if either sync pulse is active.
    pub fn any_sync(&self) -> bool {
        self.hsync || self.vsync
    }
}

impl fmt::Display for VgaOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08b} (HSYNC={}, VSYNC={})",
            self.raw,
            u8::from(self.hsync),
            u8::from(self.vsync)
        )
    }
}
