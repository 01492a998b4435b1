//! Fixed, ordered lists of waits.

use std::time::Duration;

use crate::backoff::Backoff;
use crate::counter::AttemptCounter;
use crate::error::BackoffError;

/// What a [`Sequence`] does once every entry has been handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Exhaustion {
    /// Return [`BackoffError::Stop`].
    #[default]
    Stop,
    /// Wrap around to the first entry.
    Loop,
    /// Keep returning the last entry.
    Echo,
}

/// Walks a fixed list of durations, one entry per attempt.
///
/// An empty list behaves like [`Stop`](crate::Stop) whatever the exhaustion
/// policy.
///
/// # Examples
///
/// ```rust
/// use backwater::{Backoff, BackoffError, Sequence};
/// use std::time::Duration;
///
/// let backoff = Sequence::stop(vec![Duration::from_millis(10), Duration::from_millis(50)]);
///
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(10)));
/// assert_eq!(backoff.next(false), Ok(Duration::from_millis(50)));
/// assert_eq!(backoff.next(false), Err(BackoffError::Stop));
/// ```
#[derive(Debug)]
pub struct Sequence {
    delays: Vec<Duration>,
    exhaustion: Exhaustion,
    counter: AttemptCounter,
}

impl Sequence {
    /// Create a sequence with the given exhaustion policy.
    pub fn new(delays: Vec<Duration>, exhaustion: Exhaustion) -> Self {
        Self {
            delays,
            exhaustion,
            counter: AttemptCounter::new(false),
        }
    }

    /// Stop once the list is exhausted.
    pub fn stop(delays: Vec<Duration>) -> Self {
        Self::new(delays, Exhaustion::Stop)
    }

    /// Start over from the first entry once the list is exhausted.
    pub fn looping(delays: Vec<Duration>) -> Self {
        Self::new(delays, Exhaustion::Loop)
    }

    /// Repeat the last entry once the list is exhausted.
    pub fn echo(delays: Vec<Duration>) -> Self {
        Self::new(delays, Exhaustion::Echo)
    }

    /// Make the attempt counter safe for concurrent callers.
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.counter.set_safe(safe);
        self
    }

    /// The exhaustion policy.
    pub fn exhaustion(&self) -> Exhaustion {
        self.exhaustion
    }

    /// Number of entries in the list.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// Returns true if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }
}

impl Backoff for Sequence {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        if reset {
            self.counter.reset();
            return Ok(Duration::ZERO);
        }

        let Some(last) = self.delays.last() else {
            return Err(BackoffError::Stop);
        };

        let size = self.delays.len() as u64;
        let attempt = self.counter.advance();

        match self.exhaustion {
            Exhaustion::Loop => Ok(self.delays[(attempt % size) as usize]),
            _ if attempt < size => Ok(self.delays[attempt as usize]),
            Exhaustion::Echo => Ok(*last),
            Exhaustion::Stop => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, size, "sequence exhausted");
                Err(BackoffError::Stop)
            }
        }
    }
}


#[cfg(all(test, feature = "tracing"))]
mod tracing_tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_stop_policy_logs_exhaustion() {
        let backoff = Sequence::stop(vec![Duration::from_millis(1)]);
        backoff.next(false).unwrap();
        assert_eq!(backoff.next(false), Err(BackoffError::Stop));
        assert!(logs_contain("sequence exhausted"));
    }

    #[traced_test]
    #[test]
    fn test_echo_policy_does_not_log_exhaustion() {
        let backoff = Sequence::echo(vec![Duration::from_millis(1)]);
        for _ in 0..3 {
            backoff.next(false).unwrap();
        }
        assert!(!logs_contain("sequence exhausted"));
    }
}
