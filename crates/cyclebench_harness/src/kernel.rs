//! Discrete-event execution of cooperative tasks.
//!
//! Tasks run until they suspend on a [`WaitTarget`]. The kernel then
//! delivers clock events from the [`SimContext`] until at least one parked
//! target is satisfied, and resumes every satisfied task in registration
//! order. A task parked on [`WaitTarget::Yield`] is resumed after a
//! checkpoint at the same instant, so its pending writes are visible when it
//! continues.

use tracing::trace;

use crate::context::SimContext;
use crate::error::BackendError;
use crate::waiter::WaitTarget;

/// What a task reports when it gives control back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPoll {
    /// Resume me once the target is reached.
    Suspended(WaitTarget),
    /// I am finished; never resume me again.
    Done,
}

/// A cooperative task driven by [`run`].
pub trait Task {
    /// Runs until the next suspension point or completion.
    ///
    /// An `Err` is fatal to the whole run.
    fn resume(&mut self, ctx: &mut SimContext) -> Result<TaskPoll, BackendError>;
}

#[derive(Debug)]
enum Slot {
    Ready,
    Parked(WaitTarget),
    Finished,
}

/// Runs `tasks` to completion against `ctx`.
///
/// Fails with the first [`BackendError`] raised by a task or the backend,
/// or with a fault if tasks are still waiting when no event is left to
/// deliver.
pub fn run(ctx: &mut SimContext, tasks: &mut [&mut dyn Task]) -> Result<(), BackendError> {
    let mut slots: Vec<Slot> = tasks.iter().map(|_| Slot::Ready).collect();

    loop {
        if slots.iter().all(|s| matches!(s, Slot::Finished)) {
            return Ok(());
        }

        if slots
            .iter()
            .any(|s| matches!(s, Slot::Parked(WaitTarget::Yield)))
        {
            ctx.checkpoint()?;
        }

        let mut resumed = false;
        for (index, task) in tasks.iter_mut().enumerate() {
            let runnable = match &slots[index] {
                Slot::Ready => true,
                Slot::Parked(target) => target.is_satisfied(ctx),
                Slot::Finished => false,
            };
            if !runnable {
                continue;
            }
            resumed = true;
            trace!(task = index, time = %ctx.now(), "resuming task");
            slots[index] = match task.resume(ctx)? {
                TaskPoll::Suspended(target) => Slot::Parked(target),
                TaskPoll::Done => Slot::Finished,
            };
        }

        if !resumed && !ctx.deliver_next()? {
            let waiting = slots
                .iter()
                .filter(|s| matches!(s, Slot::Parked(_)))
                .count();
            return Err(BackendError::Fault {
                time: ctx.now(),
                reason: format!(
                    "simulation stalled: {waiting} task(s) waiting with no clock events scheduled"
                ),
            });
        }
    }
}
