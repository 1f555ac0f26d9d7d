#![deny(missing_docs)]

//! Tandem — a sequential callback queue.
//!
//! # Design Goals
//!
//! Tandem is a single-threaded execution line for callback-style steps:
//!
//! - **Strict FIFO**: steps run one at a time, in push order, never overlapping
//! - **Caller-driven pacing**: each step decides when the next starts by
//!   consuming its [`Invocation`]; the queue has no timers and no polling
//! - **At-most-once continuations**: advancing consumes the invocation, so
//!   double-advancing a step is a compile error, not a runtime corruption
//!
//! # Core Concepts
//!
//! - [`CallbackQueue`]: the shared execution line; `push` runs a step
//!   immediately when the queue is idle and appends it otherwise
//! - [`Invocation`]: the handle each step receives, carrying the owner
//!   context, any bound payload, and the continuation
//! - [`Advance`]: what a continuation call achieved (ran the next step,
//!   drained the batch, or found itself stale)
//!
//! A step that never advances stalls the queue permanently: later pushes
//! append but never run. That is the contract, not a bug: the queue provides
//! ordering, not resilience.

// Modules
pub mod invocation;
mod macros;
pub mod queue;

// Re-exports for convenience
pub use invocation::{Advance, Invocation};
pub use queue::{CallbackQueue, QueueError, StepFn};

#[cfg(test)]
mod tests;
