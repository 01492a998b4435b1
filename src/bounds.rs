//! Decorators that bound another calculator.
//!
//! Each decorator wraps an inner [`Backoff`] and may short-circuit it. A bound
//! below one makes every call, resets included, fail with
//! [`BackoffError::LowBound`]. The check happens before any state is touched,
//! so the mistake is visible on the very first call.
//!
//! Bounds are not validated at construction: a policy can be assembled before
//! its limits are known, and a misconfiguration still surfaces loudly.
//!
//! # Examples
//!
//! ```rust
//! use backwater::{Backoff, BackoffError, Ceiling, Exponential, MaxAttempts};
//! use std::time::Duration;
//!
//! let growth = Exponential::new(Duration::from_millis(100), 1.0)?;
//! let capped = Ceiling::new(growth, Duration::from_millis(300));
//! let backoff = MaxAttempts::new(capped, 3, false);
//!
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(100)));
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(200)));
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(300)));
//! assert_eq!(backoff.next(false), Err(BackoffError::Stop));
//! # Ok::<(), backwater::ConfigError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::backoff::Backoff;
use crate::counter::AttemptCounter;
use crate::error::BackoffError;

fn low_bound(_decorator: &'static str) -> BackoffError {
    #[cfg(feature = "tracing")]
    tracing::warn!(decorator = _decorator, "backoff decorator configured with a bound below one");
    BackoffError::LowBound
}

/// Stops after a fixed number of consecutive non-reset calls.
///
/// The count is independent of any counter inside the wrapped calculator.
/// Once the bound is exceeded the inner calculator is no longer consulted, so
/// its own progression does not advance.
#[derive(Debug)]
pub struct MaxAttempts<B> {
    inner: B,
    bound: u32,
    counter: AttemptCounter,
}

impl<B: Backoff> MaxAttempts<B> {
    /// Allow at most `bound` waits between resets.
    ///
    /// `safe` makes the attempt counter safe for concurrent callers.
    pub fn new(inner: B, bound: u32, safe: bool) -> Self {
        Self {
            inner,
            bound,
            counter: AttemptCounter::new(safe),
        }
    }

    /// The configured attempt bound.
    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Borrow the wrapped calculator.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backoff> Backoff for MaxAttempts<B> {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if self.bound < 1 {
            return Err(low_bound("max_attempts"));
        }

        if reset {
            self.counter.reset();
            return self.inner.next(true);
        }

        let attempt = self.counter.advance().saturating_add(1);
        if attempt > u64::from(self.bound) {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, bound = self.bound, "max attempts exceeded");
            return Err(BackoffError::Stop);
        }

        self.inner.next(false)
    }
}

/// Clamps the wrapped calculator's waits to a maximum.
///
/// Errors and reset responses pass through untouched.
#[derive(Debug, Clone)]
pub struct Ceiling<B> {
    inner: B,
    bound: Duration,
}

impl<B: Backoff> Ceiling<B> {
    /// Never suggest a wait longer than `bound`.
    pub fn new(inner: B, bound: Duration) -> Self {
        Self { inner, bound }
    }

    /// The configured ceiling.
    pub fn bound(&self) -> Duration {
        self.bound
    }

    /// Borrow the wrapped calculator.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backoff> Backoff for Ceiling<B> {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if self.bound.is_zero() {
            return Err(low_bound("ceiling"));
        }

        let delay = self.inner.next(reset)?;
        if !reset && delay > self.bound {
            return Ok(self.bound);
        }
        Ok(delay)
    }
}

/// Stops once a wall-clock budget has been spent since the last reset.
///
/// The window opens at construction and reopens on every reset. When the
/// budget is gone the inner calculator is no longer consulted.
#[derive(Debug)]
pub struct Elapsed<B> {
    inner: B,
    bound: Duration,
    origin: Instant,
    // Nanoseconds from `origin` to the current window anchor.
    anchor: AtomicU64,
}

impl<B: Backoff> Elapsed<B> {
    /// Allow retries for `bound` after construction or the latest reset.
    pub fn new(inner: B, bound: Duration) -> Self {
        Self {
            inner,
            bound,
            origin: Instant::now(),
            anchor: AtomicU64::new(0),
        }
    }

    /// The configured time budget.
    pub fn bound(&self) -> Duration {
        self.bound
    }

    /// Borrow the wrapped calculator.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Time spent since the window was last anchored.
    pub fn spent(&self) -> Duration {
        let anchor = self.anchor.load(Ordering::SeqCst);
        Duration::from_nanos(self.since_origin().saturating_sub(anchor))
    }

    fn since_origin(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl<B: Backoff> Backoff for Elapsed<B> {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if self.bound.is_zero() {
            return Err(low_bound("elapsed"));
        }

        if reset {
            self.anchor.store(self.since_origin(), Ordering::SeqCst);
            return self.inner.next(true);
        }

        let elapsed = self.spent();
        if elapsed > self.bound {
            #[cfg(feature = "tracing")]
            tracing::debug!(?elapsed, bound = ?self.bound, "elapsed budget exhausted");
            return Err(BackoffError::Stop);
        }

        self.inner.next(false)
    }
}
