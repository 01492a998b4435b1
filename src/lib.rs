//! # Backwater
//!
//! > *"Slack water before the next tide"*
//!
//! Composable backoff calculators for retry loops.
//!
//! ## Philosophy
//!
//! **Backwater** separates *deciding* how long to wait from *waiting*:
//! - **Calculators** ([`Backoff`]) are pure decisions: given a reset signal,
//!   return the next wait or a stop signal. They never sleep.
//! - **Decorators** wrap a calculator to grow, bound, or randomize it.
//! - **The [`Waiter`]** is the only part that suspends, and it can be
//!   cancelled.
//!
//! ## Quick Example
//!
//! ```rust
//! use backwater::prelude::*;
//! use std::time::Duration;
//!
//! // 100ms, 200ms, 400ms, ... capped at 5s, at most 8 tries,
//! // each wait randomized by up to 20% either way.
//! let backoff = Exponential::new(Duration::from_millis(100), 1.0)?
//!     .ceiling(Duration::from_secs(5))
//!     .jitter()
//!     .under(20)
//!     .over(20)
//!     .build()?
//!     .max_attempts(8, false);
//!
//! backoff.next(true)?;
//! let first = backoff.next(false)?;
//! assert!(first >= Duration::from_millis(80) && first < Duration::from_millis(120));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Calculators
//!
//! | Type | Behaviour |
//! |------|-----------|
//! | [`Constant`], [`zero()`] | Same wait every time |
//! | [`Stop`] | Never retry |
//! | [`Exponential`] | `initial * (1 + increase)^attempt` |
//! | [`Sequence`] | Walk a fixed list; stop, loop or echo when exhausted |
//! | [`MaxAttempts`] | Stop after N waits |
//! | [`Ceiling`] | Clamp waits to a maximum |
//! | [`Elapsed`] | Stop once a time budget is spent |
//! | [`Jitter`] | Randomize waits within a band |
//!
//! ## Feature flags
//!
//! - `async` (default): the tokio-based [`Waiter`].
//! - `tracing`: structured events for stops, misconfiguration and waits.
//! - `serde`: `Serialize`/`Deserialize` for [`PolicyConfig`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backoff;
pub mod bounds;
pub mod config;
mod counter;
pub mod error;
pub mod exponential;
pub mod ext;
pub mod jitter;
pub mod primitive;
pub mod sequence;
pub mod testing;
#[cfg(feature = "async")]
pub mod waiter;

// Re-exports
pub use backoff::{from_fn, Backoff, BackoffFn, BoxedBackoff};
pub use bounds::{Ceiling, Elapsed, MaxAttempts};
pub use config::{JitterConfig, PolicyConfig, Strategy};
pub use error::{BackoffError, ConfigError, WaitError};
pub use exponential::Exponential;
pub use ext::BackoffExt;
pub use jitter::{
    source_fn, FromEntropy, IntoJitterSource, Jitter, JitterBuilder, JitterSource, OsSeededRng,
    SourceFn,
};
pub use primitive::{zero, Constant, Stop};
pub use sequence::{Exhaustion, Sequence};
#[cfg(feature = "async")]
pub use waiter::{WaitContext, Waiter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backoff::{from_fn, Backoff, BoxedBackoff};
    pub use crate::bounds::{Ceiling, Elapsed, MaxAttempts};
    pub use crate::error::{BackoffError, ConfigError, WaitError};
    pub use crate::exponential::Exponential;
    pub use crate::ext::BackoffExt;
    pub use crate::jitter::{Jitter, JitterSource};
    pub use crate::primitive::{zero, Constant, Stop};
    pub use crate::sequence::{Exhaustion, Sequence};
    #[cfg(feature = "async")]
    pub use crate::waiter::{WaitContext, Waiter};
}
