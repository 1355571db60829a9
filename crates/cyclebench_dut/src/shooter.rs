//! Pin-level model of the VGA shooter design.
//!
//! Pins: `clk`, `rst_n`, `ena`, `ui_in[3:0]`, `uio_in[7:0]` in and
//! `uo_out[7:0]` out, with
//! `uo_out = {hsync, B0, G0, R0, vsync, B1, G1, R1}`.
//!
//! `ui_in` bit 0 moves the shooter right, bit 1 moves it left, bit 2 fires.
//! Bit 3 and `uio_in` are ignored.

use cyclebench_common::{Logic, LogicVec, SimTime};
use cyclebench_harness::{Backend, BackendError, PinInfo};
use tracing::trace;

use crate::timing::VgaTiming;

const RIGHT: u32 = 0;
const LEFT: u32 = 1;
const FIRE: u32 = 2;

const SHOOTER_WIDTH: u16 = 32;
const SHOOTER_TOP: u16 = 440;
const SHOOTER_BOTTOM: u16 = 456;
const BULLET_WIDTH: u16 = 2;
const BULLET_HEIGHT: u16 = 8;
/// Lines a bullet climbs per video line.
const BULLET_SPEED: u16 = 2;

/// Registered state of the design after reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// Horizontal raster position.
    pub hpos: u16,
    /// Vertical raster position.
    pub vpos: u16,
    /// Left edge of the shooter.
    pub shooter_x: u16,
    /// Top-left corner of the bullet in flight.
    pub bullet: Option<(u16, u16)>,
    /// Fire was pressed at the previous edge.
    fire_held: bool,
}

impl GameState {
    fn reset(timing: &VgaTiming) -> Self {
        Self {
            hpos: 0,
            vpos: 0,
            shooter_x: (timing.h_visible - SHOOTER_WIDTH) / 2,
            bullet: None,
            fire_held: false,
        }
    }

    /// One enabled pixel clock.
    fn step(&mut self, timing: &VgaTiming, buttons: u64) {
        let pressed = |bit: u32| (buttons >> bit) & 1 == 1;

        if pressed(FIRE) && !self.fire_held && self.bullet.is_none() {
            let x = self.shooter_x + SHOOTER_WIDTH / 2 - BULLET_WIDTH / 2;
            self.bullet = Some((x, SHOOTER_TOP - BULLET_HEIGHT));
        }
        self.fire_held = pressed(FIRE);

        self.hpos += 1;
        if self.hpos < timing.h_total {
            return;
        }
        self.hpos = 0;
        self.vpos = (self.vpos + 1) % timing.v_total;

        let max_x = timing.h_visible - SHOOTER_WIDTH;
        match (pressed(RIGHT), pressed(LEFT)) {
            (true, false) if self.shooter_x < max_x => self.shooter_x += 1,
            (false, true) if self.shooter_x > 0 => self.shooter_x -= 1,
            _ => {}
        }
        self.bullet = self
            .bullet
            .and_then(|(x, y)| y.checked_sub(BULLET_SPEED).map(|y| (x, y)));
    }

    /// `(r, g, b)` of the pixel under the beam.
    fn pixel(&self, timing: &VgaTiming) -> (bool, bool, bool) {
        let (h, v) = (self.hpos, self.vpos);
        if !timing.visible(h, v) {
            return (false, false, false);
        }
        let in_shooter = (self.shooter_x..self.shooter_x + SHOOTER_WIDTH).contains(&h)
            && (SHOOTER_TOP..SHOOTER_BOTTOM).contains(&v);
        let in_bullet = self.bullet.is_some_and(|(x, y)| {
            (x..x + BULLET_WIDTH).contains(&h) && (y..y + BULLET_HEIGHT).contains(&v)
        });
        (in_bullet, in_shooter || in_bullet, false)
    }

    fn uo_out(&self, timing: &VgaTiming) -> u64 {
        let (r, g, b) = self.pixel(timing);
        let color = u64::from(b) << 2 | u64::from(g) << 1 | u64::from(r);
        let hsync = u64::from(timing.hsync(self.hpos));
        let vsync = u64::from(timing.vsync(self.vpos));
        hsync << 7 | color << 4 | vsync << 3 | color
    }
}

/// Behavioral model of the shooter design.
///
/// Registers are unknown until a rising `clk` edge samples `rst_n = 0`.
/// While running, an unknown `rst_n`, `ena` or `ui_in` at an edge poisons
/// the registers back to unknown; `ena = 0` freezes them. Any transition of
/// `clk` into 1 counts as rising.
pub struct VgaShooter {
    pins: Vec<PinInfo>,
    timing: VgaTiming,
    clk: Logic,
    last_clk: Logic,
    rst_n: LogicVec,
    ena: LogicVec,
    ui_in: LogicVec,
    uio_in: LogicVec,
    state: Option<GameState>,
    rising_edges: u64,
}

impl VgaShooter {
    /// Creates the design in its power-on (unknown) state.
    pub fn new() -> Self {
        Self::with_timing(VgaTiming::default())
    }

    /// Creates the design with a custom raster.
    pub fn with_timing(timing: VgaTiming) -> Self {
        Self {
            pins: vec![
                PinInfo::input("clk", 1),
                PinInfo::input("rst_n", 1),
                PinInfo::input("ena", 1),
                PinInfo::input("ui_in", 4),
                PinInfo::input("uio_in", 8),
                PinInfo::output("uo_out", 8),
            ],
            timing,
            clk: Logic::X,
            last_clk: Logic::X,
            rst_n: LogicVec::unknown(1),
            ena: LogicVec::unknown(1),
            ui_in: LogicVec::unknown(4),
            uio_in: LogicVec::unknown(8),
            state: None,
            rising_edges: 0,
        }
    }

    /// Registered state, or `None` while unknown.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Rising clock edges seen since construction.
    pub fn rising_edges(&self) -> u64 {
        self.rising_edges
    }

    fn on_rising_edge(&mut self) {
        self.rising_edges += 1;
        match self.rst_n.get(0) {
            Logic::Zero => {
                if self.state.is_none() {
                    trace!(edge = self.rising_edges, "registers initialized by reset");
                }
                self.state = Some(GameState::reset(&self.timing));
                return;
            }
            Logic::One => {}
            _ => {
                self.state = None;
                return;
            }
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match (self.ena.get(0), self.ui_in.to_u64()) {
            (Logic::Zero, _) => {}
            (Logic::One, Some(buttons)) => state.step(&self.timing, buttons),
            _ => {
                trace!(edge = self.rising_edges, "unknown input sampled, registers lost");
                self.state = None;
            }
        }
    }

    fn output(&self) -> LogicVec {
        match &self.state {
            Some(state) => LogicVec::try_from_u64(state.uo_out(&self.timing), 8)
                .unwrap_or_else(|| LogicVec::unknown(8)),
            None => LogicVec::unknown(8),
        }
    }

    fn input_mut(&mut self, pin: &str) -> Option<&mut LogicVec> {
        match pin {
            "rst_n" => Some(&mut self.rst_n),
            "ena" => Some(&mut self.ena),
            "ui_in" => Some(&mut self.ui_in),
            "uio_in" => Some(&mut self.uio_in),
            _ => None,
        }
    }
}

impl Default for VgaShooter {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for VgaShooter {
    fn pins(&self) -> &[PinInfo] {
        &self.pins
    }

    fn read(&self, pin: &str) -> Result<LogicVec, BackendError> {
        match pin {
            "clk" => Ok(LogicVec::filled(1, self.clk)),
            "rst_n" => Ok(self.rst_n.clone()),
            "ena" => Ok(self.ena.clone()),
            "ui_in" => Ok(self.ui_in.clone()),
            "uio_in" => Ok(self.uio_in.clone()),
            "uo_out" => Ok(self.output()),
            _ => Err(BackendError::UnknownPin { pin: pin.into() }),
        }
    }

    fn write(&mut self, pin: &str, value: &LogicVec) -> Result<(), BackendError> {
        let info = self
            .pin(pin)
            .ok_or_else(|| BackendError::UnknownPin { pin: pin.into() })?;
        if info.width != value.width() {
            return Err(BackendError::WidthMismatch {
                pin: pin.into(),
                expected: info.width,
                actual: value.width(),
            });
        }
        if pin == "clk" {
            self.clk = value.get(0);
            return Ok(());
        }
        match self.input_mut(pin) {
            Some(slot) => {
                *slot = value.clone();
                Ok(())
            }
            None => Err(BackendError::ReadOnlyPin { pin: pin.into() }),
        }
    }

    fn settle(&mut self, _now: SimTime) -> Result<(), BackendError> {
        if self.last_clk != Logic::One && self.clk == Logic::One {
            self.on_rising_edge();
        }
        self.last_clk = self.clk;
        Ok(())
    }
}
