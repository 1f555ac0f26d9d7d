//! Macros for pushing step sequences.
//!
//! - `sequence!`: push several steps onto a queue in one expression

/// Push a sequence of steps onto a queue, in order.
///
/// Evaluates to `Result<&queue, QueueError>`, stopping at the first failed
/// push. The usual eager-start rule applies: if the queue is idle, the first
/// step runs synchronously inside this expression.
///
/// # Example
///
/// ```
/// use tandem::{sequence, CallbackQueue};
///
/// let queue: CallbackQueue = CallbackQueue::new();
/// sequence!(
///     queue,
///     |step| { step.advance().unwrap(); },
///     |step| { step.advance().unwrap(); },
/// )
/// .unwrap();
/// assert!(queue.is_idle());
/// ```
#[macro_export]
macro_rules! sequence {
    ($queue:expr, $($step:expr),+ $(,)?) => {{
        let queue = &$queue;
        let pushed = (|| -> ::core::result::Result<(), $crate::QueueError> {
            $( queue.push($step)?; )+
            Ok(())
        })();
        pushed.map(|()| queue)
    }};
}
