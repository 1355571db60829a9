//! A minimal register DUT for unit tests.

use cyclebench_common::{Logic, LogicVec, SimTime};

use crate::backend::{Backend, PinInfo};
use crate::error::BackendError;

/// Builds a vector from MSB-first `0`/`1`/`X`/`Z` characters.
pub(crate) fn bits(s: &str) -> LogicVec {
    let mut v = LogicVec::new(s.len() as u32);
    for (i, c) in s.chars().rev().enumerate() {
        v.set(i as u32, Logic::from_char(c).unwrap());
    }
    v
}

/// `q <= d` on every rising `clk` edge while `rst_n = 1` and `ena = 1`;
/// `q <= 0` while `rst_n = 0`. Like a Verilog `posedge`, any transition
/// into 1 counts as rising. `q` starts unknown and `hiz` is never driven.
pub(crate) struct LatchDut {
    pins: Vec<PinInfo>,
    clk: Logic,
    last_clk: Logic,
    rst_n: LogicVec,
    ena: LogicVec,
    d: LogicVec,
    q: LogicVec,
    pub settles: u64,
    pub rising_edges: u64,
    pub fail_after_settles: Option<u64>,
}

impl LatchDut {
    pub fn new() -> Self {
        Self {
            pins: vec![
                PinInfo::input("clk", 1),
                PinInfo::input("rst_n", 1),
                PinInfo::input("ena", 1),
                PinInfo::input("d", 4),
                PinInfo::output("q", 4),
                PinInfo::output("hiz", 2),
            ],
            clk: Logic::X,
            last_clk: Logic::X,
            rst_n: LogicVec::unknown(1),
            ena: LogicVec::unknown(1),
            d: LogicVec::unknown(4),
            q: LogicVec::unknown(4),
            settles: 0,
            rising_edges: 0,
            fail_after_settles: None,
        }
    }
}

impl Backend for LatchDut {
    fn pins(&self) -> &[PinInfo] {
        &self.pins
    }

    fn read(&self, pin: &str) -> Result<LogicVec, BackendError> {
        match pin {
            "clk" => Ok(LogicVec::filled(1, self.clk)),
            "rst_n" => Ok(self.rst_n.clone()),
            "ena" => Ok(self.ena.clone()),
            "d" => Ok(self.d.clone()),
            "q" => Ok(self.q.clone()),
            "hiz" => Ok(LogicVec::filled(2, Logic::Z)),
            _ => Err(BackendError::UnknownPin { pin: pin.into() }),
        }
    }

    fn write(&mut self, pin: &str, value: &LogicVec) -> Result<(), BackendError> {
        match pin {
            "clk" => self.clk = value.get(0),
            "rst_n" => self.rst_n = value.clone(),
            "ena" => self.ena = value.clone(),
            "d" => self.d = value.clone(),
            "q" | "hiz" => return Err(BackendError::ReadOnlyPin { pin: pin.into() }),
            _ => return Err(BackendError::UnknownPin { pin: pin.into() }),
        }
        Ok(())
    }

    fn settle(&mut self, now: SimTime) -> Result<(), BackendError> {
        self.settles += 1;
        if self
            .fail_after_settles
            .is_some_and(|limit| self.settles > limit)
        {
            return Err(BackendError::Fault {
                time: now,
                reason: "latch model crashed".into(),
            });
        }
        if self.last_clk != Logic::One && self.clk == Logic::One {
            self.rising_edges += 1;
            match (self.rst_n.get(0), self.ena.get(0)) {
                (Logic::Zero, _) => self.q = LogicVec::new(4),
                (Logic::One, Logic::One) => self.q = self.d.clone(),
                (Logic::One, Logic::Zero) => {}
                _ => self.q = LogicVec::unknown(4),
            }
        }
        self.last_clk = self.clk;
        Ok(())
    }
}
