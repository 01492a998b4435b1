//! Property-based tests for calculator invariants

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;
use std::time::Duration;

use backwater::prelude::*;

fn durations() -> impl Strategy<Value = Vec<Duration>> {
    prop::collection::vec((1u64..10_000).prop_map(Duration::from_millis), 1..20)
}

proptest! {
    #[test]
    fn prop_reset_always_returns_zero(
        delays in durations(),
        advances in 0usize..50,
        bound in 1u32..20,
    ) {
        let backoff = Sequence::looping(delays)
            .ceiling(Duration::from_secs(5))
            .max_attempts(bound, false);

        for _ in 0..advances {
            let _ = backoff.next(false);
        }
        prop_assert_eq!(backoff.next(true), Ok(Duration::ZERO));
    }

    #[test]
    fn prop_loop_walks_the_list_modulo_its_length(
        delays in durations(),
        calls in 1usize..100,
    ) {
        let backoff = Sequence::looping(delays.clone());

        for i in 0..calls {
            prop_assert_eq!(backoff.next(false), Ok(delays[i % delays.len()]));
        }
    }

    #[test]
    fn prop_echo_repeats_the_last_entry(
        delays in durations(),
        extra in 1usize..20,
    ) {
        let backoff = Sequence::echo(delays.clone());
        let last = *delays.last().unwrap();

        for _ in 0..delays.len() {
            backoff.next(false).unwrap();
        }
        for _ in 0..extra {
            prop_assert_eq!(backoff.next(false), Ok(last));
        }
    }

    #[test]
    fn prop_ceiling_never_exceeded(
        initial_ms in 1u64..1_000,
        increase in 0.1f64..3.0,
        bound_ms in 1u64..60_000,
        calls in 1usize..80,
    ) {
        let bound = Duration::from_millis(bound_ms);
        let backoff = Exponential::new(Duration::from_millis(initial_ms), increase)
            .unwrap()
            .ceiling(bound);

        for _ in 0..calls {
            let delay = backoff.next(false).unwrap();
            prop_assert!(delay <= bound);
        }
    }

    #[test]
    fn prop_exponential_is_non_decreasing(
        initial_ms in 1u64..1_000,
        increase in 0.01f64..2.0,
        calls in 2usize..60,
    ) {
        let backoff = Exponential::new(Duration::from_millis(initial_ms), increase).unwrap();

        let mut previous = backoff.next(false).unwrap();
        for _ in 1..calls {
            let delay = backoff.next(false).unwrap();
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn prop_max_attempts_allows_exactly_bound_waits(bound in 1u32..200) {
        let backoff = zero().max_attempts(bound, true);

        for _ in 0..bound {
            prop_assert!(backoff.next(false).is_ok());
        }
        prop_assert_eq!(backoff.next(false), Err(BackoffError::Stop));
    }

    #[test]
    fn prop_jitter_stays_within_band(
        delay_ms in 1u64..100_000,
        under in 0u8..=100,
        over in 0u8..=100,
        seed in any::<u64>(),
        calls in 1usize..20,
    ) {
        prop_assume!(under > 0 || over > 0);

        let delay = Duration::from_millis(delay_ms);
        let backoff = Constant::new(delay)
            .jitter()
            .under(under)
            .over(over)
            .source(Mutex::new(StdRng::seed_from_u64(seed)))
            .build()
            .unwrap();

        let nanos = delay.as_nanos();
        let min = nanos * u128::from(100 - under) / 100;
        let max = nanos * (100 + u128::from(over)) / 100;

        for _ in 0..calls {
            let jittered = backoff.next(false).unwrap().as_nanos();
            prop_assert!(jittered >= min);
            prop_assert!(jittered < max);
        }
    }
}
