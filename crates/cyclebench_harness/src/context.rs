//! The explicit simulation context shared by every harness component.
//!
//! [`SimContext`] owns the backend, the current simulated time, the event
//! queue of clock toggles, the running clocks with their edge counters, and
//! the queue of writes that have been issued but not yet propagated. Time
//! advances only through [`SimContext::deliver_next`]; writes reach the
//! backend only at a checkpoint (a delivered event or an explicit yield).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use cyclebench_common::{Logic, LogicVec, Period, SimTime};
use tracing::{debug, trace};

use crate::backend::{Backend, PinInfo};
use crate::error::{BackendError, ScenarioError, StimulusError};
use crate::waveform::WaveformRecorder;

/// A scheduled clock toggle.
#[derive(Debug, Clone, Copy)]
struct ClockEvent {
    time: SimTime,
    /// Scheduling order; breaks ties between events at the same instant.
    seq: u64,
    /// Index into `SimContext::clocks`.
    clock: usize,
}

impl PartialEq for ClockEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ClockEvent {}

impl PartialOrd for ClockEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClockEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Runtime state of a free-running clock.
#[derive(Debug, Clone)]
struct ClockState {
    signal: String,
    period: Period,
    level: Logic,
    rising_edges: u64,
}

/// Trace recorder plus the last value written for each pin.
struct Trace {
    recorder: Box<dyn WaveformRecorder>,
    last: Vec<Option<LogicVec>>,
}

/// Simulated time, clocks, pending writes, and the backend they act on.
pub struct SimContext {
    backend: Box<dyn Backend>,
    now: SimTime,
    queue: BinaryHeap<Reverse<ClockEvent>>,
    next_seq: u64,
    clocks: Vec<ClockState>,
    pending: Vec<(String, LogicVec)>,
    trace: Option<Trace>,
    events_delivered: u64,
}

impl SimContext {
    /// Creates a context at time zero with no clocks running.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            now: SimTime::ZERO,
            queue: BinaryHeap::new(),
            next_seq: 0,
            clocks: Vec::new(),
            pending: Vec::new(),
            trace: None,
            events_delivered: 0,
        }
    }

    /// Attaches a waveform recorder and declares every backend pin to it.
    pub fn set_recorder(
        &mut self,
        mut recorder: Box<dyn WaveformRecorder>,
    ) -> Result<(), BackendError> {
        for (index, pin) in self.backend.pins().iter().enumerate() {
            recorder.register_pin(index, &pin.name, pin.width)?;
        }
        let last = vec![None; self.backend.pins().len()];
        self.trace = Some(Trace { recorder, last });
        Ok(())
    }

    /// The current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Total clock events delivered so far.
    pub fn events_delivered(&self) -> u64 {
        self.events_delivered
    }

    /// Describes the pin `name`, if the backend has one.
    pub fn pin(&self, name: &str) -> Option<&PinInfo> {
        self.backend.pin(name)
    }

    /// Reads a signal value as of the last settled instant.
    ///
    /// An unknown name is a scenario-level [`StimulusError`]; a failing read
    /// of a known pin is a [`BackendError`].
    pub fn observe(&self, signal: &str) -> Result<LogicVec, ScenarioError> {
        if self.backend.pin(signal).is_none() {
            return Err(StimulusError::UnknownSignal {
                signal: signal.to_string(),
            }
            .into());
        }
        Ok(self.backend.read(signal)?)
    }

    /// Rising edges delivered so far on `clock`, or `None` if it is not running.
    pub fn rising_edges(&self, clock: &str) -> Option<u64> {
        self.clocks
            .iter()
            .find(|c| c.signal == clock)
            .map(|c| c.rising_edges)
    }

    /// The current cycle number: rising edges of the first running clock.
    pub fn cycle(&self) -> u64 {
        self.clocks.first().map_or(0, |c| c.rising_edges)
    }

    /// Returns true if any clock is running.
    pub fn has_running_clock(&self) -> bool {
        !self.clocks.is_empty()
    }

    /// Number of writes issued but not yet visible to the backend.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Queues a write for the next checkpoint.
    pub(crate) fn queue_write(&mut self, signal: &str, value: LogicVec) {
        trace!(signal, %value, time = %self.now, "write queued");
        self.pending.push((signal.to_string(), value));
    }

    /// Registers a clock whose first (rising) toggle is half a period away.
    ///
    /// The pin is driven low and the backend settled at the current instant,
    /// so the first rising edge is a real 0 to 1 transition whatever level
    /// the pin was left at. Other pending writes stay queued.
    pub(crate) fn add_clock(&mut self, signal: &str, period: Period) -> Result<(), BackendError> {
        self.backend.write(signal, &LogicVec::from_bool(false))?;
        self.backend.settle(self.now)?;
        self.record_trace()?;

        let index = self.clocks.len();
        self.clocks.push(ClockState {
            signal: signal.to_string(),
            period,
            level: Logic::Zero,
            rising_edges: 0,
        });
        self.schedule(index, self.now + period.half());
        Ok(())
    }

    fn schedule(&mut self, clock: usize, time: SimTime) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ClockEvent { time, seq, clock }));
    }

    /// Stops every clock and drops their scheduled toggles.
    ///
    /// Edge counters are discarded with the clocks; a clock started again
    /// counts from zero.
    pub fn stop_clocks(&mut self) {
        if !self.clocks.is_empty() {
            debug!(count = self.clocks.len(), time = %self.now, "stopping clocks");
        }
        self.clocks.clear();
        self.queue.clear();
    }

    /// Drops every write that has not reached the backend yet.
    ///
    /// Returns how many writes were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 {
            debug!(dropped, time = %self.now, "discarding pending writes");
        }
        self.pending.clear();
        dropped
    }

    /// Makes every pending write visible and settles the backend without advancing time.
    pub fn checkpoint(&mut self) -> Result<(), BackendError> {
        self.flush_pending()?;
        self.backend.settle(self.now)?;
        self.record_trace()
    }

    /// Advances to the next clock event: applies pending writes, toggles the
    /// clock, settles the backend, and counts the edge.
    ///
    /// Returns `false` if no event is scheduled.
    pub fn deliver_next(&mut self) -> Result<bool, BackendError> {
        let Some(Reverse(event)) = self.queue.pop() else {
            return Ok(false);
        };
        debug_assert!(event.time >= self.now, "time moved backwards");
        self.now = event.time;
        self.flush_pending()?;

        let clock = &mut self.clocks[event.clock];
        let rising = clock.level != Logic::One;
        clock.level = Logic::from_bool(rising);
        let signal = clock.signal.clone();
        let half = clock.period.half();
        self.backend
            .write(&signal, &LogicVec::from_bool(rising))?;
        self.backend.settle(self.now)?;
        if rising {
            self.clocks[event.clock].rising_edges += 1;
        }
        self.events_delivered += 1;
        self.record_trace()?;
        self.schedule(event.clock, self.now + half);
        Ok(true)
    }

    /// Flushes the waveform trace, if one is attached.
    pub fn finish_trace(&mut self) -> Result<(), BackendError> {
        if let Some(trace) = &mut self.trace {
            trace.recorder.finalize()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<(), BackendError> {
        for (signal, value) in std::mem::take(&mut self.pending) {
            self.backend.write(&signal, &value)?;
        }
        Ok(())
    }

    fn record_trace(&mut self) -> Result<(), BackendError> {
        let Some(trace) = &mut self.trace else {
            return Ok(());
        };
        for (index, pin) in self.backend.pins().iter().enumerate() {
            let value = self.backend.read(&pin.name)?;
            if trace.last[index].as_ref() != Some(&value) {
                trace
                    .recorder
                    .record_change(self.now.fs, index, &value)?;
                trace.last[index] = Some(value);
            }
        }
        Ok(())
    }
}
