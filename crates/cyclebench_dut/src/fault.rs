//! A backend wrapper that crashes after a set number of settles.

use cyclebench_common::{LogicVec, SimTime};
use cyclebench_harness::{Backend, BackendError, PinInfo};

/// Forwards everything to `inner` until `settles_before_fault` settles have
/// succeeded, then fails every further settle with [`BackendError::Fault`].
#[derive(Debug)]
pub struct FaultInjector<B> {
    inner: B,
    settles_before_fault: u64,
    settles: u64,
}

impl<B: Backend> FaultInjector<B> {
    /// Wraps `inner`.
    pub fn new(inner: B, settles_before_fault: u64) -> Self {
        Self {
            inner,
            settles_before_fault,
            settles: 0,
        }
    }

    /// Settles performed so far, including the failing ones.
    pub fn settles(&self) -> u64 {
        self.settles
    }

    /// Unwraps the inner backend.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backend> Backend for FaultInjector<B> {
    fn pins(&self) -> &[PinInfo] {
        self.inner.pins()
    }

    fn read(&self, pin: &str) -> Result<LogicVec, BackendError> {
        self.inner.read(pin)
    }

    fn write(&mut self, pin: &str, value: &LogicVec) -> Result<(), BackendError> {
        self.inner.write(pin, value)
    }

    fn settle(&mut self, now: SimTime) -> Result<(), BackendError> {
        self.settles += 1;
        if self.settles > self.settles_before_fault {
            return Err(BackendError::Fault {
                time: now,
                reason: format!(
                    "injected fault after {} settles",
                    self.settles_before_fault
                ),
            });
        }
        self.inner.settle(now)
    }
}
