//! Randomized perturbation of another calculator's waits.
//!
//! Many clients that fail together tend to retry together. Jitter spreads
//! their retries across a band around the suggested wait so they stop
//! hammering the recovering resource in lockstep.
//!
//! # Examples
//!
//! ```rust
//! use backwater::{Backoff, Constant, Jitter};
//! use std::time::Duration;
//!
//! // Anywhere between 75ms and 125ms
//! let backoff = Jitter::builder(Constant::new(Duration::from_millis(100)))
//!     .under(25)
//!     .over(25)
//!     .build()?;
//!
//! let delay = backoff.next(false)?;
//! assert!(delay >= Duration::from_millis(75));
//! assert!(delay < Duration::from_millis(125));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::backoff::Backoff;
use crate::error::{BackoffError, ConfigError};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A source of uniformly distributed offsets.
///
/// Sampling takes `&self`; sources shared between several decorators are
/// responsible for their own synchronization. The decorator adds none.
pub trait JitterSource {
    /// Return a value uniformly distributed in `[0, span)`. `span` is never zero.
    ///
    /// Spans are nanosecond widths and can exceed `u64::MAX` when the wrapped
    /// wait is close to [`Duration::MAX`].
    fn sample(&self, span: u128) -> u128;
}

impl<S: JitterSource + ?Sized> JitterSource for &S {
    fn sample(&self, span: u128) -> u128 {
        (**self).sample(span)
    }
}

impl<S: JitterSource + ?Sized> JitterSource for Arc<S> {
    fn sample(&self, span: u128) -> u128 {
        (**self).sample(span)
    }
}

impl<R: RngCore> JitterSource for Mutex<R> {
    fn sample(&self, span: u128) -> u128 {
        let mut rng = self.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(0..span)
    }
}

/// The default source: a [`StdRng`] seeded from the operating system.
pub struct OsSeededRng {
    rng: Mutex<StdRng>,
}

impl OsSeededRng {
    /// Seed a new generator from operating system entropy.
    pub fn new() -> Result<Self, ConfigError> {
        let rng = StdRng::try_from_os_rng().map_err(|e| ConfigError::Entropy(e.to_string()))?;
        Ok(Self {
            rng: Mutex::new(rng),
        })
    }
}

impl JitterSource for OsSeededRng {
    fn sample(&self, span: u128) -> u128 {
        JitterSource::sample(&self.rng, span)
    }
}

impl fmt::Debug for OsSeededRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsSeededRng").finish_non_exhaustive()
    }
}

/// A [`JitterSource`] backed by a closure.
///
/// Created by [`source_fn`].
#[derive(Clone)]
pub struct SourceFn<F> {
    f: F,
}

impl<F: Fn(u128) -> u128> JitterSource for SourceFn<F> {
    fn sample(&self, span: u128) -> u128 {
        (self.f)(span)
    }
}

impl<F> fmt::Debug for SourceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFn").finish_non_exhaustive()
    }
}

/// Turn a closure into a [`JitterSource`].
///
/// The closure must honour the `[0, span)` range contract.
pub fn source_fn<F: Fn(u128) -> u128>(f: F) -> SourceFn<F> {
    SourceFn { f }
}

/// Adds bounded randomness to the wrapped calculator's waits.
///
/// The wrapped calculator is always consulted first, so attempt progression
/// does not depend on whether jitter applies. Errors, reset responses and
/// zero waits pass through unchanged. Otherwise, for a wait `d`, the result
/// is uniformly drawn from `[d * (100 - under) / 100, d * (100 + over) / 100)`.
pub struct Jitter<B, S = OsSeededRng> {
    inner: B,
    source: S,
    under: u8,
    over: u8,
}

impl<B: Backoff> Jitter<B> {
    /// Start configuring jitter around `inner`.
    pub fn builder(inner: B) -> JitterBuilder<B> {
        JitterBuilder {
            inner,
            source: FromEntropy,
            under: 0,
            over: 0,
        }
    }
}

impl<B, S> Jitter<B, S> {
    /// Maximum reduction, in percent.
    pub fn under(&self) -> u8 {
        self.under
    }

    /// Maximum increase, in percent.
    pub fn over(&self) -> u8 {
        self.over
    }

    /// Borrow the wrapped calculator.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backoff, S: JitterSource> Backoff for Jitter<B, S> {
    fn next(&self, reset: bool) -> Result<Duration, BackoffError> {
        let delay = self.inner.next(reset)?;
        if reset || delay.is_zero() {
            return Ok(delay);
        }

        let nanos = delay.as_nanos();
        let min = nanos * u128::from(100 - self.under) / 100;
        let max = nanos * u128::from(100 + u16::from(self.over)) / 100;

        let span = max - min;
        let offset = if span == 0 {
            0
        } else {
            self.source.sample(span)
        };

        Ok(from_nanos_saturating(min.saturating_add(offset)))
    }
}

impl<B: fmt::Debug, S> fmt::Debug for Jitter<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jitter")
            .field("inner", &self.inner)
            .field("under", &self.under)
            .field("over", &self.over)
            .finish_non_exhaustive()
    }
}

fn from_nanos_saturating(nanos: u128) -> Duration {
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

/// Marker telling [`JitterBuilder::build`] to seed a fresh [`OsSeededRng`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FromEntropy;

/// Anything a [`JitterBuilder`] can turn into a [`JitterSource`] at build time.
pub trait IntoJitterSource {
    /// The source the decorator will sample from.
    type Source: JitterSource;

    /// Produce the source, failing if it cannot be created.
    fn into_source(self) -> Result<Self::Source, ConfigError>;
}

impl IntoJitterSource for FromEntropy {
    type Source = OsSeededRng;

    fn into_source(self) -> Result<OsSeededRng, ConfigError> {
        OsSeededRng::new()
    }
}

impl<S: JitterSource> IntoJitterSource for S {
    type Source = S;

    fn into_source(self) -> Result<S, ConfigError> {
        Ok(self)
    }
}

/// Builder for [`Jitter`].
///
/// Created by [`Jitter::builder`]. At least one of [`under`](Self::under) or
/// [`over`](Self::over) must be set, and neither may exceed 100.
pub struct JitterBuilder<B, P = FromEntropy> {
    inner: B,
    source: P,
    under: u8,
    over: u8,
}

impl<B: Backoff, P: IntoJitterSource> JitterBuilder<B, P> {
    /// Maximum percent by which a wait may be shortened (0 to 100).
    pub fn under(mut self, percent: u8) -> Self {
        self.under = percent;
        self
    }

    /// Maximum percent by which a wait may be lengthened (0 to 100).
    pub fn over(mut self, percent: u8) -> Self {
        self.over = percent;
        self
    }

    /// Use a specific source of randomness instead of an OS-seeded generator.
    pub fn source<S: JitterSource>(self, source: S) -> JitterBuilder<B, S> {
        JitterBuilder {
            inner: self.inner,
            source,
            under: self.under,
            over: self.over,
        }
    }

    /// Validate the configuration and build the decorator.
    pub fn build(self) -> Result<Jitter<B, P::Source>, ConfigError> {
        if self.under > 100 {
            return Err(ConfigError::JitterPercent {
                side: "under",
                percent: self.under,
            });
        }
        if self.over > 100 {
            return Err(ConfigError::JitterPercent {
                side: "over",
                percent: self.over,
            });
        }
        if self.under == 0 && self.over == 0 {
            return Err(ConfigError::JitterUndefined);
        }

        Ok(Jitter {
            inner: self.inner,
            source: self.source.into_source()?,
            under: self.under,
            over: self.over,
        })
    }
}

impl<B: fmt::Debug, P> fmt::Debug for JitterBuilder<B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitterBuilder")
            .field("inner", &self.inner)
            .field("under", &self.under)
            .field("over", &self.over)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::from_fn;
    use crate::primitive::{zero, Constant, Stop};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn bottom() -> SourceFn<impl Fn(u128) -> u128> {
        source_fn(|_| 0)
    }

    fn top() -> SourceFn<impl Fn(u128) -> u128> {
        source_fn(|span| span - 1)
    }

    #[test]
    fn test_build_rejects_undefined_band() {
        let result = Jitter::builder(zero()).build();
        assert_eq!(result.unwrap_err(), ConfigError::JitterUndefined);
    }

    #[test]
    fn test_build_rejects_percent_over_100() {
        let under = Jitter::builder(zero()).under(101).build();
        assert!(matches!(
            under,
            Err(ConfigError::JitterPercent { side: "under", percent: 101 })
        ));

        let over = Jitter::builder(zero()).over(101).over(101).build();
        assert!(matches!(
            over,
            Err(ConfigError::JitterPercent { side: "over", percent: 101 })
        ));
    }

    #[test]
    fn test_pinned_to_bottom_of_range() {
        let base = Duration::from_secs(10);
        let cases = [(10, 0, 9), (10, 10, 9), (0, 10, 10)];

        for (under, over, expected) in cases {
            let backoff = Jitter::builder(Constant::new(base))
                .under(under)
                .over(over)
                .source(bottom())
                .build()
                .unwrap();
            assert_eq!(backoff.next(false), Ok(Duration::from_secs(expected)));
            assert_eq!(backoff.next(true), Ok(Duration::ZERO));
        }
    }

    #[test]
    fn test_pinned_to_top_of_range_is_exclusive() {
        let base = Duration::from_secs(10);
        let one = Duration::from_nanos(1);
        let cases = [(10, 0, 10), (10, 10, 11), (0, 10, 11)];

        for (under, over, bound) in cases {
            let backoff = Jitter::builder(Constant::new(base))
                .under(under)
                .over(over)
                .source(top())
                .build()
                .unwrap();
            assert_eq!(backoff.next(false), Ok(Duration::from_secs(bound) - one));
        }
    }

    #[test]
    fn test_full_reduction_band() {
        let backoff = Jitter::builder(Constant::new(Duration::from_secs(4)))
            .under(100)
            .source(bottom())
            .build()
            .unwrap();
        assert_eq!(backoff.next(false), Ok(Duration::ZERO));
    }

    #[test]
    fn test_errors_and_zero_pass_through() {
        let stop = Jitter::builder(Stop).under(50).source(top()).build().unwrap();
        assert_eq!(stop.next(false), Err(BackoffError::Stop));

        let nothing = Jitter::builder(zero()).over(50).source(top()).build().unwrap();
        assert_eq!(nothing.next(false), Ok(Duration::ZERO));
    }

    #[test]
    fn test_empty_span_skips_source() {
        let sampled = AtomicU32::new(0);
        let source = source_fn(|span| {
            sampled.fetch_add(1, Ordering::SeqCst);
            span - 1
        });
        // 5ns * 110 / 100 truncates back to 5ns.
        let backoff = Jitter::builder(Constant::new(Duration::from_nanos(5)))
            .over(10)
            .source(&source)
            .build()
            .unwrap();

        assert_eq!(backoff.next(false), Ok(Duration::from_nanos(5)));
        assert_eq!(sampled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_inner_always_consulted() {
        let calls = AtomicU32::new(0);
        let inner = from_fn(|reset| {
            calls.fetch_add(1, Ordering::SeqCst);
            if reset {
                Ok(Duration::ZERO)
            } else {
                Err(BackoffError::Stop)
            }
        });
        let backoff = Jitter::builder(&inner).under(10).source(top()).build().unwrap();

        let _ = backoff.next(false);
        let _ = backoff.next(true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_seeded_sources_are_deterministic() {
        let make = || {
            Jitter::builder(Constant::new(Duration::from_secs(10)))
                .under(25)
                .over(25)
                .source(Mutex::new(StdRng::seed_from_u64(42)))
                .build()
                .unwrap()
        };
        let first = make();
        let second = make();

        for _ in 0..10 {
            assert_eq!(first.next(false), second.next(false));
        }
    }

    #[test]
    fn test_default_source_spreads_values() {
        let backoff = Jitter::builder(Constant::new(Duration::from_secs(10)))
            .under(25)
            .over(25)
            .build()
            .unwrap();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            let delay = backoff.next(false).unwrap();
            assert!(delay >= Duration::from_millis(7_500));
            assert!(delay < Duration::from_millis(12_500));
            seen.insert(delay);
        }
        assert!(seen.len() > 1, "twenty identical jittered values");
    }

    #[test]
    fn test_shared_source() {
        let source = Arc::new(Mutex::new(StdRng::seed_from_u64(7)));
        let a = Jitter::builder(Constant::new(Duration::from_secs(1)))
            .over(50)
            .source(Arc::clone(&source))
            .build()
            .unwrap();
        let b = Jitter::builder(Constant::new(Duration::from_secs(2)))
            .under(50)
            .source(Arc::clone(&source))
            .build()
            .unwrap();

        assert!(a.next(false).unwrap() >= Duration::from_secs(1));
        assert!(b.next(false).unwrap() < Duration::from_secs(2));
    }

    #[test]
    fn test_wide_band_keeps_full_span() {
        let backoff = Jitter::builder(Constant::new(Duration::MAX))
            .under(50)
            .source(top())
            .build()
            .unwrap();
        assert_eq!(
            backoff.next(false),
            Ok(Duration::MAX - Duration::from_nanos(1))
        );

        let low = Jitter::builder(Constant::new(Duration::MAX))
            .under(50)
            .source(bottom())
            .build()
            .unwrap();
        let half = low.next(false).unwrap();
        assert!(half < Duration::MAX / 2 + Duration::from_secs(1));
        assert!(half > Duration::MAX / 2 - Duration::from_secs(1));
    }

    #[test]
    fn test_saturates_on_huge_durations() {
        let backoff = Jitter::builder(Constant::new(Duration::MAX))
            .over(100)
            .source(top())
            .build()
            .unwrap();
        assert_eq!(backoff.next(false), Ok(Duration::MAX));
    }
}
