//! Error types for backoff calculation and waiting.
//!
//! Three families of errors exist, one per phase of a retry loop:
//!
//! - [`ConfigError`]: returned synchronously by constructors when a calculator
//!   is structurally misconfigured. The instance is never created.
//! - [`BackoffError`]: returned by [`Backoff::next`](crate::Backoff::next). Either
//!   the policy has run out of patience ([`BackoffError::Stop`]) or a decorator
//!   was given a bound too low to be meaningful ([`BackoffError::LowBound`]).
//! - [`WaitError`]: returned by the [`Waiter`](crate::Waiter). Wraps a
//!   [`BackoffError`] verbatim, or reports that the wait was cut short.
//!
//! All sentinels are enum variants, so callers compare by kind:
//!
//! ```rust
//! use backwater::{Backoff, BackoffError, Stop};
//!
//! let err = Stop.next(false).unwrap_err();
//! assert_eq!(err, BackoffError::Stop);
//! assert!(err.is_stop());
//! ```

use std::time::Duration;

use thiserror::Error;

/// Signals produced by a calculator instead of a duration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackoffError {
    /// No further attempts should be made.
    ///
    /// Recoverable: calling `next(true)` starts the sequence over.
    #[error("stop any further attempts")]
    Stop,
    /// A bounding decorator was constructed with a bound below one.
    ///
    /// Returned on every call, including resets, until the decorator is
    /// rebuilt with a sensible bound.
    #[error("boundary condition too low")]
    LowBound,
}

impl BackoffError {
    /// Returns true if this is the stop signal.
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Returns true if this is the low-bound configuration error.
    pub fn is_low_bound(&self) -> bool {
        matches!(self, Self::LowBound)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Stop => "backoff_stop",
            Self::LowBound => "backoff_low_bound",
        }
    }
}

/// Errors raised while constructing a calculator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The exponential seed duration was zero.
    #[error("initial must be greater than zero: {0:?}")]
    InvalidInitial(Duration),
    /// The exponential growth rate was NaN, infinite, zero or negative.
    #[error("increase must be a real number greater than zero: {0}")]
    InvalidIncrease(f64),
    /// Neither an under nor an over jitter percentage was set.
    #[error("jitter over and under not defined")]
    JitterUndefined,
    /// A jitter percentage exceeded 100.
    #[error("cannot jitter {side} more than 100 percent: {percent}")]
    JitterPercent {
        /// Which side of the band was misconfigured (`"under"` or `"over"`).
        side: &'static str,
        /// The rejected percentage.
        percent: u8,
    },
    /// The operating system entropy source could not seed the default randomizer.
    ///
    /// Holds the `Display` text of the OS RNG error; the error itself is not
    /// kept as a source.
    #[error("failed to seed jitter randomizer: {0}")]
    Entropy(String),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InvalidInitial(_) => "config_invalid_initial",
            Self::InvalidIncrease(_) => "config_invalid_increase",
            Self::JitterUndefined => "config_jitter_undefined",
            Self::JitterPercent { .. } => "config_jitter_percent",
            Self::Entropy(_) => "config_entropy",
        }
    }
}

/// Errors returned by [`Waiter::wait`](crate::Waiter::wait).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The calculator refused to produce a duration. No waiting happened.
    #[error(transparent)]
    Backoff(#[from] BackoffError),
    /// The wait context was cancelled before the duration elapsed.
    #[error("wait cancelled")]
    Cancelled,
    /// The wait context deadline passed before the duration elapsed.
    #[error("wait deadline exceeded")]
    DeadlineExceeded,
}

impl WaitError {
    /// Returns true if the calculator signalled [`BackoffError::Stop`].
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Backoff(BackoffError::Stop))
    }

    /// Returns true if the wait was cut short by cancellation or deadline.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Get the calculator error if present.
    pub fn backoff(&self) -> Option<BackoffError> {
        match self {
            Self::Backoff(e) => Some(*e),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Backoff(e) => e.as_label(),
            Self::Cancelled => "wait_cancelled",
            Self::DeadlineExceeded => "wait_deadline_exceeded",
        }
    }
}
