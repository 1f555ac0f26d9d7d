//! The queue itself: shared state, push, reset and teardown.
//!
//! A [`CallbackQueue`] is a cheap handle over `Rc<RefCell<_>>` state. Handles
//! are freely clonable; the clone refers to the same execution line. The
//! queue is deliberately `!Send`: steps run on whatever thread pushes or
//! advances, and only one step is ever in flight.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::invocation::{Advance, Invocation};

/// Boxed step callback. Receives the [`Invocation`] for its slot and nothing
/// else; bound and forwarded payloads travel inside the invocation.
pub type StepFn<C, T> = Box<dyn FnOnce(Invocation<C, T>) + 'static>;

/// Errors reported by queue operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was torn down with [`CallbackQueue::destroy`] and must not
    /// be used again.
    #[error("callback queue has been destroyed")]
    Destroyed,
}

/// One appended step: the callback plus the payload bound at push time.
pub(crate) struct Slot<C, T> {
    pub(crate) callback: StepFn<C, T>,
    pub(crate) bound: Option<T>,
}

/// Shared queue state. Idle is a pure function of the counters:
/// `appended == 0`, so a push from inside a running callback always sees a
/// non-idle queue and appends.
pub(crate) struct Inner<C, T> {
    /// Steps appended but not yet started.
    pub(crate) pending: VecDeque<Slot<C, T>>,
    /// Position of the step currently executing or just completed.
    pub(crate) cursor: usize,
    /// High-water mark: steps ever appended in the current batch, including
    /// ones already consumed.
    pub(crate) appended: usize,
    /// Bumped on every reset. A retained continuation whose generation no
    /// longer matches is stale and advances nothing.
    pub(crate) generation: u64,
    /// Receiver context handed to every step. `None` means callbacks reach
    /// the queue itself through their invocation handle.
    pub(crate) owner: Option<Rc<C>>,
    pub(crate) destroyed: bool,
}

impl<C, T> Inner<C, T> {
    fn new(owner: Option<Rc<C>>) -> Self {
        Self {
            pending: VecDeque::new(),
            cursor: 0,
            appended: 0,
            generation: 0,
            owner,
            destroyed: false,
        }
    }

    /// Back to idle: counters zeroed, pending dropped, generation bumped so
    /// any continuation still out there goes stale.
    pub(crate) fn reset(&mut self) {
        self.pending.clear();
        self.cursor = 0;
        self.appended = 0;
        self.generation += 1;
    }
}

/// A sequential callback queue.
///
/// Steps pushed onto the queue run strictly one at a time, in push order.
/// A push onto an idle queue runs the step synchronously before `push`
/// returns (eager start); a push onto a running queue appends, and the step
/// runs once every earlier step has advanced past it.
///
/// # Type Parameters
/// - `C`: the owner context callbacks are invoked on behalf of
/// - `T`: the payload type for push-time binding and continuation forwarding
///
/// # Example
///
/// ```
/// use tandem::CallbackQueue;
///
/// let queue: CallbackQueue = CallbackQueue::new();
/// queue
///     .push(|step| {
///         // first push on an idle queue runs inline
///         step.advance().unwrap();
///     })
///     .unwrap();
/// assert!(queue.is_idle());
/// ```
pub struct CallbackQueue<C = (), T = ()> {
    inner: Rc<RefCell<Inner<C, T>>>,
}

impl<C, T> Clone for CallbackQueue<C, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Handle identity: two queue values are equal when they refer to the same
/// underlying execution line.
impl<C, T> PartialEq for CallbackQueue<C, T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C, T> Eq for CallbackQueue<C, T> {}

impl<C, T> Default for CallbackQueue<C, T>
where
    C: 'static,
    T: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> fmt::Debug for CallbackQueue<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("CallbackQueue")
            .field("index", &inner.cursor)
            .field("length", &inner.appended)
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

impl<C, T> CallbackQueue<C, T>
where
    C: 'static,
    T: 'static,
{
    /// Create an idle queue with no owner context.
    ///
    /// Callbacks observe the queue itself through [`Invocation::queue`];
    /// [`Invocation::owner`] returns `None`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new(None))),
        }
    }

    /// Create an idle queue whose callbacks all observe `owner` through
    /// [`Invocation::owner`].
    pub fn with_owner(owner: C) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new(Some(Rc::new(owner))))),
        }
    }

    /// Push a step onto the queue.
    ///
    /// If the queue is idle this runs `callback` synchronously, before `push`
    /// returns; external effects of the callback are observable by the time
    /// the call completes. Otherwise the step is appended and runs once the
    /// step ahead of it advances. Pushing from inside a running callback
    /// always appends: the queue is not idle during that window.
    ///
    /// Returns the queue for chaining. `push` never reports whether the
    /// callback itself succeeded, and a panicking callback is not caught:
    /// the panic reaches whoever triggered the step, and the rest of the
    /// batch is effectively abandoned until [`clear`](Self::clear).
    ///
    /// # Errors
    ///
    /// [`QueueError::Destroyed`] if [`destroy`](Self::destroy) was called.
    pub fn push<F>(&self, callback: F) -> Result<&Self, QueueError>
    where
        F: FnOnce(Invocation<C, T>) + 'static,
    {
        self.push_slot(Slot {
            callback: Box::new(callback),
            bound: None,
        })
    }

    /// Push a step with a payload bound at push time.
    ///
    /// The payload is replayed verbatim to the callback through
    /// [`Invocation::take_bound`] when the step runs, the partial-application
    /// analogue for steps defined away from their data.
    ///
    /// # Errors
    ///
    /// [`QueueError::Destroyed`] if [`destroy`](Self::destroy) was called.
    pub fn push_with<F>(&self, callback: F, bound: T) -> Result<&Self, QueueError>
    where
        F: FnOnce(Invocation<C, T>) + 'static,
    {
        self.push_slot(Slot {
            callback: Box::new(callback),
            bound: Some(bound),
        })
    }

    fn push_slot(&self, slot: Slot<C, T>) -> Result<&Self, QueueError> {
        let eager = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return Err(QueueError::Destroyed);
            }
            if inner.appended == 0 {
                // Eager start. Account for the slot before running it so the
                // queue reads as running for the whole callback.
                inner.appended = 1;
                inner.cursor = 0;
                Some((slot, inner.generation))
            } else {
                let position = inner.appended;
                inner.appended += 1;
                inner.pending.push_back(slot);
                trace!("step {position} queued");
                None
            }
        };
        // The borrow is released before the step runs: the callback may push,
        // advance or clear reentrantly.
        if let Some((slot, generation)) = eager {
            trace!("step 0 started eagerly");
            self.run(slot, 0, generation, None);
        }
        Ok(self)
    }

    /// Invoke a dequeued step. The `RefCell` borrow must already be released:
    /// the callback may push, advance or clear reentrantly.
    pub(crate) fn run(&self, slot: Slot<C, T>, position: usize, generation: u64, passed: Option<T>) {
        let invocation = Invocation::new(self.clone(), position, generation, slot.bound, passed);
        (slot.callback)(invocation);
    }

    /// Continuation entry point; see [`Invocation::advance`].
    pub(crate) fn advance_from(
        &self,
        position: usize,
        generation: u64,
        passed: Option<T>,
    ) -> Result<Advance, QueueError> {
        let next = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return Err(QueueError::Destroyed);
            }
            if generation != inner.generation || position != inner.cursor {
                trace!("stale continuation for step {position} ignored");
                return Ok(Advance::Stale);
            }
            match inner.pending.pop_front() {
                Some(slot) => {
                    inner.cursor += 1;
                    Some((slot, inner.cursor, inner.generation))
                }
                None => {
                    trace!("batch of {} drained, queue idle", inner.appended);
                    inner.reset();
                    None
                }
            }
        };
        match next {
            Some((slot, position, generation)) => {
                trace!("advancing to step {position}");
                self.run(slot, position, generation, passed);
                Ok(Advance::Ran)
            }
            None => Ok(Advance::Drained),
        }
    }

    /// Discard every step that has not started and reset to idle.
    ///
    /// A callback currently mid-flight keeps running; only the bookkeeping is
    /// wiped. If that callback later advances, its continuation finds the
    /// batch gone and reports [`Advance::Stale`] without running anything.
    /// The next `push` is eager again.
    pub fn clear(&self) -> &Self {
        let mut inner = self.inner.borrow_mut();
        trace!(
            "clearing queue, abandoning {} pending step(s)",
            inner.pending.len()
        );
        inner.reset();
        self
    }

    /// Tear the queue down: [`clear`](Self::clear) semantics, plus the owner
    /// reference is released and the queue is marked non-reusable.
    ///
    /// Any later `push` or continuation call fails with
    /// [`QueueError::Destroyed`]. Destroying twice is harmless.
    pub fn destroy(&self) {
        let mut inner = self.inner.borrow_mut();
        trace!("destroying queue");
        inner.reset();
        inner.owner = None;
        inner.destroyed = true;
    }

    /// The owner context callbacks observe, if one was provided.
    pub fn owner(&self) -> Option<Rc<C>> {
        self.inner.borrow().owner.clone()
    }

    /// Position of the step currently executing or just completed.
    /// Reads 0 when the queue is idle.
    pub fn index(&self) -> usize {
        self.inner.borrow().cursor
    }

    /// High-water mark of the current batch: every step appended since the
    /// queue was last idle, including steps already consumed. Not the count
    /// of remaining steps. Reads 0 when the queue is idle.
    pub fn len(&self) -> usize {
        self.inner.borrow().appended
    }

    /// True when no batch is in progress; an alias for [`is_idle`](Self::is_idle)
    /// phrased for the conventional `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.is_idle()
    }

    /// True when no step is pending or running. The next `push` on an idle
    /// queue runs its step eagerly.
    pub fn is_idle(&self) -> bool {
        self.inner.borrow().appended == 0
    }

    /// True while the cursor addresses the final slot of the current batch.
    /// False on an idle queue.
    pub fn is_last_index(&self) -> bool {
        let inner = self.inner.borrow();
        inner.appended > 0 && inner.cursor + 1 == inner.appended
    }

    /// True once [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }
}
