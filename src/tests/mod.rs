//! Tests for the sequential callback queue.
//!
//! ## Test Organization
//!
//! - `common`: Shared helpers (journal, parked continuations, log setup)
//! - `basic`: Eager start, accessors, chaining, the `sequence!` macro
//! - `ordering`: FIFO across held continuations, reentrant pushes
//! - `forwarding`: Push-time payloads and continuation forwarding
//! - `lifecycle`: `clear`, `destroy`, stale continuations, stalls
//! - `owner`: Receiver-context binding
//!
//! ## Conventions
//!
//! Steps record a label into a shared `Journal` when they run, so every test
//! asserts on the observed execution order rather than on internal state
//! alone. Continuations held past a callback's return are parked in a
//! `Parked` cell and resumed from the test body.

mod common;

mod lifecycle;
