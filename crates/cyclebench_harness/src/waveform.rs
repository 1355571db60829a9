//! Waveform tracing of DUT pins.
//!
//! [`VcdRecorder`] writes IEEE 1364 Value Change Dump text with a 1 fs
//! timescale, so a finished run can be inspected in any waveform viewer.

use std::io::{self, Write};

use cyclebench_common::{Logic, LogicVec};

/// Sink for pin value changes.
pub trait WaveformRecorder {
    /// Declares pin number `index` before any change is recorded.
    fn register_pin(&mut self, index: usize, name: &str, width: u32) -> io::Result<()>;

    /// Records that pin `index` took `value` at `time_fs`.
    fn record_change(&mut self, time_fs: u64, index: usize, value: &LogicVec) -> io::Result<()>;

    /// Flushes the trace.
    fn finalize(&mut self) -> io::Result<()>;
}

/// VCD writer over any [`Write`].
pub struct VcdRecorder<W: Write> {
    writer: W,
    scope: String,
    /// `(pin index, id code, width)` in registration order.
    vars: Vec<(usize, String, u32)>,
    definitions_closed: bool,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder whose pins live in module scope `scope`.
    pub fn new(writer: W, scope: impl Into<String>) -> Self {
        Self {
            writer,
            scope: scope.into(),
            vars: Vec::new(),
            definitions_closed: false,
            current_time: None,
        }
    }

    /// Consumes the recorder and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  cyclebench")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1fs")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$scope module {} $end", self.scope)
    }

    fn close_definitions(&mut self) -> io::Result<()> {
        if self.vars.is_empty() {
            self.write_header()?;
        }
        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;
        self.definitions_closed = true;
        Ok(())
    }

    /// Identifier codes are printable ASCII starting at `!`, base 94.
    fn id_code(index: usize) -> String {
        let mut code = String::new();
        let mut idx = index;
        loop {
            code.push((b'!' + (idx % 94) as u8) as char);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        code
    }

    fn vcd_char(bit: Logic) -> char {
        match bit {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_pin(&mut self, index: usize, name: &str, width: u32) -> io::Result<()> {
        if self.vars.is_empty() {
            self.write_header()?;
        }
        let code = Self::id_code(self.vars.len());
        writeln!(self.writer, "$var wire {width} {code} {name} $end")?;
        self.vars.push((index, code, width));
        Ok(())
    }

    fn record_change(&mut self, time_fs: u64, index: usize, value: &LogicVec) -> io::Result<()> {
        if !self.definitions_closed {
            self.close_definitions()?;
        }
        if self.current_time != Some(time_fs) {
            writeln!(self.writer, "#{time_fs}")?;
            self.current_time = Some(time_fs);
        }
        let Some((_, code, width)) = self.vars.iter().find(|(i, _, _)| *i == index) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pin {index} was never registered with the trace"),
            ));
        };
        if *width == 1 {
            writeln!(self.writer, "{}{code}", Self::vcd_char(value.get(0)))
        } else {
            let bits: String = (0..*width).rev().map(|i| Self::vcd_char(value.get(i))).collect();
            writeln!(self.writer, "b{bits} {code}")
        }
    }

    fn finalize(&mut self) -> io::Result<()> {
        if !self.definitions_closed {
            self.close_definitions()?;
        }
        self.writer.flush()
    }
}
