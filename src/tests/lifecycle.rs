//! Reset and teardown: `clear`, `destroy` and stale continuations.

use std::cell::Cell;
use std::rc::Rc;

use crate::{Advance, CallbackQueue, QueueError};

use super::common::{journal, park, parking, record, recorded, resume};

/// `clear` discards every step that has not started. A continuation held by
/// the step that was mid-flight finds the batch gone and runs nothing.
#[test]
fn clear_abandons_pending_steps() {
    let queue: CallbackQueue = CallbackQueue::new();
    let journal = journal();
    let parked = parking();

    let (j, p) = (journal.clone(), parked.clone());
    queue
        .push(move |step| {
            record(&j, "first");
            park(&p, step);
        })
        .expect("push should succeed");

    for label in ["second", "third"] {
        let j = journal.clone();
        queue
            .push(move |step| {
                record(&j, label);
                step.advance().expect("advance should succeed");
            })
            .expect("push should succeed");
    }

    let held = resume(&parked);
    queue.clear();

    assert_eq!(queue.len(), 0);
    assert_eq!(queue.index(), 0);
    assert!(queue.is_idle());

    // The held continuation is stale: steps two and three were discarded.
    assert_eq!(held.advance(), Ok(Advance::Stale));
    assert_eq!(recorded(&journal), vec!["first"]);
    assert!(queue.is_idle());

    // A fresh push starts a new batch eagerly.
    let j = journal.clone();
    queue
        .push(move |step| {
            record(&j, "fresh");
            step.advance().expect("advance should succeed");
        })
        .expect("push should succeed");
    assert_eq!(recorded(&journal), vec!["first", "fresh"]);
}

/// A stale continuation from a cleared batch cannot touch the batch that
/// replaced it, even when cursor positions happen to line up.
#[test]
fn stale_continuation_cannot_cross_batches() {
    let queue: CallbackQueue = CallbackQueue::new();
    let journal = journal();
    let parked = parking();

    let p = parked.clone();
    queue
        .push(move |step| park(&p, step))
        .expect("push should succeed");
    let old = resume(&parked);

    queue.clear();

    // New batch: a running step at position 0, one queued behind it.
    let p = parked.clone();
    queue
        .push(move |step| park(&p, step))
        .expect("push should succeed");
    let j = journal.clone();
    queue
        .push(move |step| {
            record(&j, "new-second");
            step.advance().expect("advance should succeed");
        })
        .expect("push should succeed");

    // Same position, older generation: must not release "new-second".
    assert_eq!(old.advance(), Ok(Advance::Stale));
    assert_eq!(recorded(&journal), Vec::<&str>::new());

    assert_eq!(resume(&parked).advance(), Ok(Advance::Ran));
    assert_eq!(recorded(&journal), vec!["new-second"]);
}

/// `clear` is chainable.
#[test]
fn clear_is_chainable() {
    let queue: CallbackQueue = CallbackQueue::new();
    let journal = journal();

    let j = journal.clone();
    queue
        .clear()
        .push(move |step| {
            record(&j, "a");
            step.advance().expect("advance should succeed");
        })
        .expect("push should succeed");

    assert_eq!(recorded(&journal), vec!["a"]);
}

/// After `destroy`, pushing fails loudly instead of queueing silently.
#[test]
fn push_after_destroy_fails() {
    let queue: CallbackQueue = CallbackQueue::new();
    queue.destroy();

    assert!(queue.is_destroyed());
    let result = queue.push(|step| {
        step.advance().expect("advance should succeed");
    });
    assert_eq!(result.err(), Some(QueueError::Destroyed));
}

/// A continuation held across `destroy` fails loudly too.
#[test]
fn advance_after_destroy_fails() {
    let queue: CallbackQueue = CallbackQueue::new();
    let parked = parking();

    let p = parked.clone();
    queue
        .push(move |step| park(&p, step))
        .expect("push should succeed");

    let held = resume(&parked);
    queue.destroy();

    assert_eq!(held.advance(), Err(QueueError::Destroyed));
}

/// Destroying twice is harmless.
#[test]
fn destroy_is_idempotent() {
    let queue: CallbackQueue = CallbackQueue::new();
    queue.destroy();
    queue.destroy();
    assert!(queue.is_destroyed());
}

/// `destroy` releases the owner so its resources are reclaimed.
#[test]
fn destroy_releases_owner() {
    struct Probe {
        dropped: Rc<Cell<bool>>,
    }

    impl Drop for Probe {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    let dropped = Rc::new(Cell::new(false));
    let queue: CallbackQueue<Probe> = CallbackQueue::with_owner(Probe {
        dropped: dropped.clone(),
    });

    assert!(!dropped.get());
    queue.destroy();
    assert!(dropped.get());
    assert!(queue.owner().is_none());
}
