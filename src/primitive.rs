//! Fixed-output calculators.
//!
//! These are used standalone or as the innermost stage of a decorator chain.

use std::time::Duration;

use crate::backoff::Backoff;
use crate::error::BackoffError;

/// Always suggests the same wait.
///
/// # Examples
///
/// ```rust
/// use backwater::{Backoff, Constant};
/// use std::time::Duration;
///
/// let backoff = Constant::new(Duration::from_secs(1));
/// assert_eq!(backoff.next(false), Ok(Duration::from_secs(1)));
/// assert_eq!(backoff.next(false), Ok(Duration::from_secs(1)));
/// assert_eq!(backoff.next(true), Ok(Duration::ZERO));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    delay: Duration,
}

impl Constant {
    /// Create a calculator that always returns `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Backoff for Constant {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if reset {
            return Ok(Duration::ZERO);
        }
        Ok(self.delay)
    }
}

/// A calculator that never waits.
pub fn zero() -> Constant {
    Constant::new(Duration::ZERO)
}

/// A calculator that always says stop.
///
/// Resets still succeed. Sequence calculators with no entries fall back to
/// this behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stop;

impl Backoff for Stop {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if reset {
            return Ok(Duration::ZERO);
        }
        Err(BackoffError::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_repeats_delay() {
        let backoff = Constant::new(Duration::from_secs(60));
        for _ in 0..5 {
            assert_eq!(backoff.next(false), Ok(Duration::from_secs(60)));
        }
        assert_eq!(backoff.delay(), Duration::from_secs(60));
    }

    #[test]
    fn test_constant_reset_returns_zero() {
        let backoff = Constant::new(Duration::from_secs(60));
        assert_eq!(backoff.next(true), Ok(Duration::ZERO));
        assert_eq!(backoff.next(false), Ok(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_never_waits() {
        let backoff = zero();
        assert_eq!(backoff.next(false), Ok(Duration::ZERO));
        assert_eq!(backoff.next(true), Ok(Duration::ZERO));
    }

    #[test]
    fn test_stop_always_stops() {
        for _ in 0..3 {
            assert_eq!(Stop.next(false), Err(BackoffError::Stop));
        }
        assert_eq!(Stop.next(true), Ok(Duration::ZERO));
    }
}
