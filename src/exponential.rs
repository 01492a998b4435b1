//! Geometric backoff.

use std::time::Duration;

use crate::backoff::Backoff;
use crate::counter::AttemptCounter;
use crate::error::{BackoffError, ConfigError};

/// Suggests waits that grow geometrically with each attempt.
///
/// Delay for attempt `n` (0-indexed since the last reset) is
/// `initial * (1 + increase)^n`. Results that would not fit in a
/// [`Duration`] saturate at [`Duration::MAX`].
///
/// # Examples
///
/// ```rust
/// use backwater::{Backoff, Exponential};
/// use std::time::Duration;
///
/// let backoff = Exponential::new(Duration::from_millis(100), 1.0)?;
///
/// // Delay doubles: 100ms, 200ms, 400ms
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(100)));
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(200)));
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(400)));
///
/// // Reset starts over
/// assert_eq!(backoff.next(true), Ok(Duration::ZERO));
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(100)));
/// # Ok::<(), backwater::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Exponential {
    counter: AttemptCounter,
    seed_nanos: f64,
    factor: f64,
    stop_after: u64,
}

impl Exponential {
    /// Create an exponential calculator.
    ///
    /// `initial` must be non-zero and `increase` must be a finite number
    /// greater than zero. The growth factor is `1 + increase`, so an
    /// `increase` of `1.0` doubles the wait each attempt.
    pub fn new(initial: Duration, increase: f64) -> Result<Self, ConfigError> {
        if initial.is_zero() {
            return Err(ConfigError::InvalidInitial(initial));
        }
        if !increase.is_finite() || increase <= 0.0 {
            return Err(ConfigError::InvalidIncrease(increase));
        }

        Ok(Self {
            counter: AttemptCounter::new(false),
            seed_nanos: initial.as_nanos() as f64,
            factor: 1.0 + increase,
            stop_after: 0,
        })
    }

    /// Make the attempt counter safe for concurrent callers.
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.counter.set_safe(safe);
        self
    }

    /// Return [`BackoffError::Stop`] once `attempts` waits have been handed out.
    ///
    /// Zero disables the limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backwater::{Backoff, BackoffError, Exponential};
    /// use std::time::Duration;
    ///
    /// let backoff = Exponential::new(Duration::from_millis(10), 1.0)?.with_stop_after(2);
    ///
    /// assert!(backoff.next(false).is_ok());
    /// assert!(backoff.next(false).is_ok());
    /// assert_eq!(backoff.next(false), Err(BackoffError::Stop));
    /// # Ok::<(), backwater::ConfigError>(())
    /// ```
    pub fn with_stop_after(mut self, attempts: u32) -> Self {
        self.stop_after = u64::from(attempts);
        self
    }

    /// The growth factor (`1 + increase`).
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Whether the attempt counter is updated atomically.
    pub fn is_safe(&self) -> bool {
        self.counter.is_safe()
    }

    fn delay_for(&self, attempt: u64) -> Duration {
        // Exponents beyond i32 overflow to infinity long before that anyway.
        let exponent = attempt.min(i32::MAX as u64) as i32;
        let nanos = self.seed_nanos * self.factor.powi(exponent);
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return Duration::MAX;
        }
        Duration::from_nanos(nanos as u64)
    }
}

impl Backoff for Exponential {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if reset {
            self.counter.reset();
            return Ok(Duration::ZERO);
        }

        let attempt = self.counter.advance();
        if self.stop_after > 0 && attempt >= self.stop_after {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, stop_after = self.stop_after, "exponential backoff exhausted");
            return Err(BackoffError::Stop);
        }

        Ok(self.delay_for(attempt))
    }
}
