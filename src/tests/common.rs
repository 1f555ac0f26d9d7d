//! Common helpers for queue tests.
//!
//! Callbacks cannot borrow from the test frame, so everything shared between
//! a test body and its steps travels through `Rc<RefCell<_>>` cells:
//!
//! - `Journal`: append-only record of which steps ran, in what order
//! - `Parked`: a cell a step drops its invocation into, so the test body can
//!   resume the queue after the callback has returned

use std::cell::RefCell;
use std::rc::Rc;

use crate::Invocation;

/// Shared record of step labels in execution order.
pub type Journal = Rc<RefCell<Vec<&'static str>>>;

/// Create an empty journal.
pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Append a label to the journal.
pub fn record(journal: &Journal, label: &'static str) {
    journal.borrow_mut().push(label);
}

/// Snapshot the journal contents.
pub fn recorded(journal: &Journal) -> Vec<&'static str> {
    journal.borrow().clone()
}

/// A cell holding a continuation across its callback's return.
pub type Parked<C = (), T = ()> = Rc<RefCell<Option<Invocation<C, T>>>>;

/// Create an empty parking cell.
pub fn parking<C: 'static, T: 'static>() -> Parked<C, T> {
    Rc::new(RefCell::new(None))
}

/// Park an invocation for the test body to resume later.
pub fn park<C: 'static, T: 'static>(cell: &Parked<C, T>, invocation: Invocation<C, T>) {
    *cell.borrow_mut() = Some(invocation);
}

/// Take the parked invocation out, panicking if none is there.
pub fn resume<C: 'static, T: 'static>(cell: &Parked<C, T>) -> Invocation<C, T> {
    cell.borrow_mut()
        .take()
        .expect("a continuation should be parked")
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}
