//! Attempt counter shared by the stateful calculators.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic attempt counter with an optional linearizable mode.
///
/// In safe mode every advance is a single `fetch_add`, so concurrent callers
/// each observe a distinct attempt index. Otherwise the counter is updated
/// with a separate load and store: cheaper, and still memory safe, but racing
/// callers may see the same index twice.
#[derive(Debug)]
pub(crate) struct AttemptCounter {
    count: AtomicU64,
    safe: bool,
}

impl AttemptCounter {
    pub(crate) fn new(safe: bool) -> Self {
        Self {
            count: AtomicU64::new(0),
            safe,
        }
    }

    pub(crate) fn is_safe(&self) -> bool {
        self.safe
    }

    pub(crate) fn set_safe(&mut self, safe: bool) {
        self.safe = safe;
    }

    pub(crate) fn reset(&self) {
        let order = if self.safe {
            Ordering::SeqCst
        } else {
            Ordering::Relaxed
        };
        self.count.store(0, order);
    }

    /// Advance the counter, returning the attempt index before the increment.
    pub(crate) fn advance(&self) -> u64 {
        if self.safe {
            self.count.fetch_add(1, Ordering::SeqCst)
        } else {
            let current = self.count.load(Ordering::Relaxed);
            self.count
                .store(current.saturating_add(1), Ordering::Relaxed);
            current
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
