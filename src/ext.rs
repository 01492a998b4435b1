//! Extension trait providing fluent composition for calculators.

use std::time::Duration;

use crate::backoff::{Backoff, BoxedBackoff};
use crate::bounds::{Ceiling, Elapsed, MaxAttempts};
use crate::jitter::{Jitter, JitterBuilder};

/// Fluent decorator methods available on every [`Backoff`].
///
/// Each method consumes the calculator and returns it wrapped, so a policy
/// reads inside-out in call order.
///
/// # Examples
///
/// ```rust
/// use backwater::prelude::*;
/// use std::time::Duration;
///
/// let backoff = Exponential::new(Duration::from_millis(50), 0.5)?
///     .ceiling(Duration::from_secs(2))
///     .max_attempts(10, false)
///     .boxed();
///
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(50)));
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(75)));
/// # Ok::<(), backwater::ConfigError>(())
/// ```
pub trait BackoffExt: Backoff + Sized {
    /// Stop after `bound` waits between resets. See [`MaxAttempts`].
    fn max_attempts(self, bound: u32, safe: bool) -> MaxAttempts<Self> {
        MaxAttempts::new(self, bound, safe)
    }

    /// Clamp every wait to at most `bound`. See [`Ceiling`].
    fn ceiling(self, bound: Duration) -> Ceiling<Self> {
        Ceiling::new(self, bound)
    }

    /// Stop once `bound` of wall-clock time has passed since the last reset.
    /// See [`Elapsed`].
    fn elapsed(self, bound: Duration) -> Elapsed<Self> {
        Elapsed::new(self, bound)
    }

    /// Start configuring a [`Jitter`] decorator.
    fn jitter(self) -> JitterBuilder<Self> {
        Jitter::builder(self)
    }

    /// Erase the concrete type.
    fn boxed(self) -> BoxedBackoff
    where
        Self: Send + Sync + 'static,
    {
        Box::new(self)
    }

    /// Wrap in a [`Waiter`](crate::Waiter) that sleeps for each suggested wait.
    #[cfg(feature = "async")]
    fn waiter(self) -> crate::waiter::Waiter<Self> {
        crate::waiter::Waiter::new(self)
    }
}

impl<B: Backoff> BackoffExt for B {}
