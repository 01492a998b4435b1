//! The calculator contract.
//!
//! A [`Backoff`] answers one question: "how long should I wait before the next
//! attempt?" It never waits itself; that is the job of the
//! [`Waiter`](crate::Waiter). Keeping the decision separate from the blocking
//! makes every calculator deterministic and testable without clocks.
//!
//! # Examples
//!
//! ```rust
//! use backwater::{Backoff, Constant};
//! use std::time::Duration;
//!
//! let backoff = Constant::new(Duration::from_millis(250));
//!
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(250)));
//! assert_eq!(backoff.next(true), Ok(Duration::ZERO));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::BackoffError;

/// Tells a caller how long to wait between attempts.
///
/// # Contract
///
/// - `next(true)` clears any progression state (attempt counters, time
///   anchors) and returns `Ok(Duration::ZERO)`. Bounding decorators with a
///   bound below one are the only exception: they fail every call with
///   [`BackoffError::LowBound`].
/// - `next(false)` returns the duration to wait before the next attempt,
///   [`BackoffError::Stop`] when no further attempts should be made, or a
///   configuration error.
///
/// Calls take `&self` so a calculator can be shared; stateful calculators keep
/// their counters in atomics.
pub trait Backoff {
    /// Compute the wait before the next attempt, optionally resetting first.
    fn next(&self, reset: bool) -> Result<Duration, BackoffError>;
}

/// A type-erased, shareable calculator.
pub type BoxedBackoff = Box<dyn Backoff + Send + Sync>;

impl<B: Backoff + ?Sized> Backoff for &B {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        (**self).next(reset)
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        (**self).next(reset)
    }
}

impl<B: Backoff + ?Sized> Backoff for Arc<B> {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        (**self).next(reset)
    }
}

/// A calculator backed by a closure.
///
/// Created by [`from_fn`].
#[derive(Clone)]
pub struct BackoffFn<F> {
    f: F,
}

impl<F> Backoff for BackoffFn<F>
where
    F: Fn(bool) -> Result<Duration, BackoffError>,
{
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        (self.f)(reset)
    }
}

impl<F> fmt::Debug for BackoffFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffFn").finish_non_exhaustive()
    }
}

/// Turn a closure into a [`Backoff`].
///
/// Handy for test doubles and one-off policies. The closure is responsible
/// for honouring the reset contract.
///
/// # Examples
///
/// ```rust
/// use backwater::{from_fn, Backoff, BackoffError};
/// use std::time::Duration;
///
/// let backoff = from_fn(|reset| {
///     if reset {
///         Ok(Duration::ZERO)
///     } else {
///         Err(BackoffError::Stop)
///     }
/// });
///
/// assert_eq!(backoff.next(false), Err(BackoffError::Stop));
/// ```
pub fn from_fn<F>(f: F) -> BackoffFn<F>
where
    F: Fn(bool) -> Result<Duration, BackoffError>,
{
    BackoffFn { f }
}
