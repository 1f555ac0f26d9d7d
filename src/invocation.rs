//! The per-step handle: owner context, payloads and the continuation.
//!
//! Every callback receives an [`Invocation`] by value. Owning it is owning
//! the right to advance the queue exactly once: [`Invocation::advance`]
//! consumes the handle, so calling a continuation twice for the same step is
//! a compile error rather than a runtime corruption. A callback that wants to
//! finish later simply moves its invocation into whatever will complete the
//! work and returns.

use std::fmt;
use std::rc::Rc;

use crate::queue::{CallbackQueue, QueueError};

/// What a continuation call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The next queued step was invoked (and has returned or suspended).
    Ran,
    /// The batch was exhausted; the queue reset to idle and the next push
    /// will run its step eagerly.
    Drained,
    /// The continuation outlived its batch: [`CallbackQueue::clear`] or a
    /// drain reset the queue after this step started. Nothing ran and no
    /// state changed.
    Stale,
}

/// The handle a running step holds on its queue.
///
/// Carries everything the step was invoked with:
///
/// - the owner context ([`owner`](Self::owner)) or, absent one, the queue
///   itself ([`queue`](Self::queue))
/// - the payload bound at push time ([`take_bound`](Self::take_bound))
/// - the payload forwarded by the previous step's continuation
///   ([`take_passed`](Self::take_passed))
/// - the continuation ([`advance`](Self::advance) /
///   [`advance_with`](Self::advance_with))
///
/// The handle may outlive the callback's own execution: move it into a timer
/// callback, an event handler, wherever the step's completion is decided.
/// Invoking it after the queue was cleared is a no-op reported as
/// [`Advance::Stale`]; invoking it after [`CallbackQueue::destroy`] fails
/// with [`QueueError::Destroyed`].
pub struct Invocation<C = (), T = ()> {
    queue: CallbackQueue<C, T>,
    position: usize,
    generation: u64,
    bound: Option<T>,
    passed: Option<T>,
}

impl<C, T> fmt::Debug for Invocation<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<C, T> Invocation<C, T>
where
    C: 'static,
    T: 'static,
{
    pub(crate) fn new(
        queue: CallbackQueue<C, T>,
        position: usize,
        generation: u64,
        bound: Option<T>,
        passed: Option<T>,
    ) -> Self {
        Self {
            queue,
            position,
            generation,
            bound,
            passed,
        }
    }

    /// The owner context this step runs on behalf of, if the queue was built
    /// with [`CallbackQueue::with_owner`].
    pub fn owner(&self) -> Option<Rc<C>> {
        self.queue.owner()
    }

    /// The queue this step belongs to. This is the receiver context when no
    /// owner was provided, and the way a step pushes follow-up work.
    pub fn queue(&self) -> &CallbackQueue<C, T> {
        &self.queue
    }

    /// This step's position in the current batch (0 for the eager first step).
    pub fn position(&self) -> usize {
        self.position
    }

    /// True when this step occupies the final slot appended so far. A later
    /// reentrant push makes this false for the still-running step.
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.queue.len()
    }

    /// The payload bound at push time, if any.
    pub fn bound(&self) -> Option<&T> {
        self.bound.as_ref()
    }

    /// Take ownership of the payload bound at push time.
    pub fn take_bound(&mut self) -> Option<T> {
        self.bound.take()
    }

    /// The payload the previous step passed to its continuation, if any.
    /// Always `None` for an eagerly started step.
    pub fn passed(&self) -> Option<&T> {
        self.passed.as_ref()
    }

    /// Take ownership of the forwarded payload.
    pub fn take_passed(&mut self) -> Option<T> {
        self.passed.take()
    }

    /// This step is done; run the next queued step, or reset the queue to
    /// idle if none remain.
    ///
    /// The next step (if any) runs synchronously inside this call, under the
    /// same conventions this step was invoked with. Consuming `self` means a
    /// step advances at most once.
    ///
    /// # Errors
    ///
    /// [`QueueError::Destroyed`] if the queue was destroyed while this
    /// invocation was held.
    pub fn advance(self) -> Result<Advance, QueueError> {
        self.queue
            .advance_from(self.position, self.generation, None)
    }

    /// Like [`advance`](Self::advance), forwarding `value` to the next step,
    /// which receives it through [`take_passed`](Self::take_passed).
    ///
    /// If this was the last step of the batch the value is dropped with it.
    ///
    /// # Errors
    ///
    /// [`QueueError::Destroyed`] if the queue was destroyed while this
    /// invocation was held.
    pub fn advance_with(self, value: T) -> Result<Advance, QueueError> {
        self.queue
            .advance_from(self.position, self.generation, Some(value))
    }
}
