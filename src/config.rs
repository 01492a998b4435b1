//! Declarative backoff policies.
//!
//! [`PolicyConfig`] is plain data describing a calculator and the decorators
//! around it. It can be cloned, compared, and (with the `serde` feature)
//! loaded from configuration files, then turned into a live calculator with
//! [`PolicyConfig::build`].
//!
//! Decorators are applied in a fixed order, innermost first:
//! strategy → ceiling → jitter → max attempts → elapsed.
//!
//! # Examples
//!
//! ```rust
//! use backwater::{Backoff, BackoffError, PolicyConfig, Strategy};
//! use std::time::Duration;
//!
//! let policy = PolicyConfig::new(Strategy::Exponential {
//!     initial: Duration::from_millis(100),
//!     increase: 1.0,
//!     stop_after: 0,
//! })
//! .with_ceiling(Duration::from_millis(250))
//! .with_max_attempts(3);
//!
//! let backoff = policy.build()?;
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(100)));
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(200)));
//! assert_eq!(backoff.next(false), Ok(Duration::from_millis(250)));
//! assert_eq!(backoff.next(false), Err(BackoffError::Stop));
//! # Ok::<(), backwater::ConfigError>(())
//! ```

use std::time::Duration;

use crate::backoff::BoxedBackoff;
use crate::bounds::{Ceiling, Elapsed, MaxAttempts};
use crate::error::ConfigError;
use crate::exponential::Exponential;
use crate::jitter::Jitter;
use crate::primitive::{zero, Constant, Stop};
use crate::sequence::{Exhaustion, Sequence};

/// The innermost calculator of a policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Strategy {
    /// See [`Constant`].
    Constant {
        /// Wait between attempts.
        delay: Duration,
    },
    /// Never wait.
    Zero,
    /// Never retry. See [`Stop`].
    Stop,
    /// See [`Exponential`].
    Exponential {
        /// Wait before the first retry.
        initial: Duration,
        /// Growth rate; the factor is `1 + increase`.
        increase: f64,
        /// Stop after this many waits; zero disables the limit.
        #[cfg_attr(feature = "serde", serde(default))]
        stop_after: u32,
    },
    /// See [`Sequence`].
    Sequence {
        /// Waits, in order.
        delays: Vec<Duration>,
        /// Behaviour once the list is exhausted.
        #[cfg_attr(feature = "serde", serde(default))]
        exhaustion: Exhaustion,
    },
}

impl Strategy {
    /// Build the calculator this strategy describes.
    ///
    /// `safe` selects atomic attempt counters where the strategy has one.
    pub fn build(&self, safe: bool) -> Result<BoxedBackoff, ConfigError> {
        let backoff: BoxedBackoff = match self {
            Self::Constant { delay } => Box::new(Constant::new(*delay)),
            Self::Zero => Box::new(zero()),
            Self::Stop => Box::new(Stop),
            Self::Exponential {
                initial,
                increase,
                stop_after,
            } => Box::new(
                Exponential::new(*initial, *increase)?
                    .with_safe(safe)
                    .with_stop_after(*stop_after),
            ),
            Self::Sequence { delays, exhaustion } => {
                Box::new(Sequence::new(delays.clone(), *exhaustion).with_safe(safe))
            }
        };
        Ok(backoff)
    }
}

/// Jitter band, in percent of the suggested wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JitterConfig {
    /// Maximum reduction (0 to 100).
    #[cfg_attr(feature = "serde", serde(default))]
    pub under: u8,
    /// Maximum increase (0 to 100).
    #[cfg_attr(feature = "serde", serde(default))]
    pub over: u8,
}

/// A complete, declarative backoff policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyConfig {
    /// The innermost calculator.
    pub strategy: Strategy,
    /// Use atomic attempt counters throughout.
    #[cfg_attr(feature = "serde", serde(default))]
    pub safe: bool,
    /// See [`MaxAttempts`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_attempts: Option<u32>,
    /// See [`Ceiling`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub ceiling: Option<Duration>,
    /// See [`Elapsed`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub elapsed: Option<Duration>,
    /// See [`Jitter`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub jitter: Option<JitterConfig>,
}

impl PolicyConfig {
    /// A policy with no decorators.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            safe: false,
            max_attempts: None,
            ceiling: None,
            elapsed: None,
            jitter: None,
        }
    }

    /// Use atomic attempt counters throughout.
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    /// Stop after `bound` waits between resets.
    pub fn with_max_attempts(mut self, bound: u32) -> Self {
        self.max_attempts = Some(bound);
        self
    }

    /// Clamp every wait to at most `bound`.
    pub fn with_ceiling(mut self, bound: Duration) -> Self {
        self.ceiling = Some(bound);
        self
    }

    /// Stop once `bound` has passed since the last reset.
    pub fn with_elapsed(mut self, bound: Duration) -> Self {
        self.elapsed = Some(bound);
        self
    }

    /// Randomize waits within `under`/`over` percent.
    pub fn with_jitter(mut self, under: u8, over: u8) -> Self {
        self.jitter = Some(JitterConfig { under, over });
        self
    }

    /// Validate and assemble the calculator.
    pub fn build(&self) -> Result<BoxedBackoff, ConfigError> {
        let mut backoff = self.strategy.build(self.safe)?;

        if let Some(bound) = self.ceiling {
            backoff = Box::new(Ceiling::new(backoff, bound));
        }
        if let Some(JitterConfig { under, over }) = self.jitter {
            backoff = Box::new(Jitter::builder(backoff).under(under).over(over).build()?);
        }
        if let Some(bound) = self.max_attempts {
            backoff = Box::new(MaxAttempts::new(backoff, bound, self.safe));
        }
        if let Some(bound) = self.elapsed {
            backoff = Box::new(Elapsed::new(backoff, bound));
        }

        Ok(backoff)
    }
}

impl From<Strategy> for PolicyConfig {
    fn from(strategy: Strategy) -> Self {
        Self::new(strategy)
    }
}
