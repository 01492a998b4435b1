//! Test doubles for code that consumes calculators.
//!
//! # Examples
//!
//! ## Pinned jitter
//!
//! ```rust
//! use backwater::prelude::*;
//! use backwater::testing::PinnedSource;
//! use std::time::Duration;
//!
//! let backoff = Constant::new(Duration::from_secs(10))
//!     .jitter()
//!     .under(10)
//!     .source(PinnedSource::low())
//!     .build()?;
//!
//! assert_eq!(backoff.next(false), Ok(Duration::from_secs(9)));
//! # Ok::<(), backwater::ConfigError>(())
//! ```
//!
//! ## Scripted calculator
//!
//! ```rust
//! use backwater::{Backoff, BackoffError};
//! use backwater::testing::Recorder;
//! use std::time::Duration;
//!
//! let recorder = Recorder::new(vec![Ok(Duration::from_millis(5)), Err(BackoffError::Stop)]);
//!
//! assert_eq!(recorder.next(false), Ok(Duration::from_millis(5)));
//! assert_eq!(recorder.next(false), Err(BackoffError::Stop));
//! assert_eq!(recorder.calls(), vec![false, false]);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::backoff::Backoff;
use crate::error::BackoffError;
use crate::jitter::JitterSource;

/// A jitter source pinned to one end of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinnedSource {
    /// Always samples `0`.
    Low,
    /// Always samples `span - 1`, the largest value the range allows.
    High,
}

impl PinnedSource {
    /// Pin to the bottom of the band.
    pub fn low() -> Self {
        Self::Low
    }

    /// Pin to the top of the band.
    pub fn high() -> Self {
        Self::High
    }
}

impl JitterSource for PinnedSource {
    fn sample(&self, span: u128) -> u128 {
        match self {
            Self::Low => 0,
            Self::High => span.saturating_sub(1),
        }
    }
}

/// A calculator that replays scripted results and records every call.
///
/// Resets always answer `Ok(Duration::ZERO)` and do not consume the script.
/// Once the script runs out, non-reset calls return [`BackoffError::Stop`].
#[derive(Debug, Default)]
pub struct Recorder {
    script: Mutex<VecDeque<Result<Duration, BackoffError>>>,
    calls: Mutex<Vec<bool>>,
}

impl Recorder {
    /// Replay `script` in order.
    pub fn new(script: Vec<Result<Duration, BackoffError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The `reset` flag of every call so far, in order.
    pub fn calls(&self) -> Vec<bool> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of non-reset calls so far.
    pub fn attempts(&self) -> usize {
        self.calls().iter().filter(|reset| !**reset).count()
    }
}

impl Backoff for Recorder {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reset);

        if reset {
            return Ok(Duration::ZERO);
        }

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(BackoffError::Stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_sources() {
        assert_eq!(PinnedSource::low().sample(10), 0);
        assert_eq!(PinnedSource::high().sample(10), 9);
    }

    #[test]
    fn test_recorder_replays_then_stops() {
        let recorder = Recorder::new(vec![Ok(Duration::from_secs(1))]);

        assert_eq!(recorder.next(true), Ok(Duration::ZERO));
        assert_eq!(recorder.next(false), Ok(Duration::from_secs(1)));
        assert_eq!(recorder.next(false), Err(BackoffError::Stop));
        assert_eq!(recorder.calls(), vec![true, false, false]);
        assert_eq!(recorder.attempts(), 2);
    }
}
