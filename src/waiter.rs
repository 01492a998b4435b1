//! Turning a calculator's decision into an actual, cancellable wait.
//!
//! The [`Waiter`] is the only place in the crate that suspends. It asks its
//! calculator for the next wait and then sleeps, racing the sleep against the
//! cancellation token and optional deadline carried by a [`WaitContext`].
//!
//! # Examples
//!
//! A poll loop that backs off on failure and resets on success:
//!
//! ```rust
//! use backwater::prelude::*;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let waiter = Constant::new(Duration::from_millis(1))
//!     .max_attempts(3, false)
//!     .waiter();
//! let ctx = WaitContext::new();
//!
//! waiter.wait(&ctx, true).await.unwrap();
//!
//! let mut failures = 0;
//! loop {
//!     let succeeded = false; // poll the resource here
//!     match waiter.wait(&ctx, succeeded).await {
//!         Ok(()) => failures += 1,
//!         Err(e) if e.is_stop() => break,
//!         Err(e) => panic!("unexpected: {e}"),
//!     }
//! }
//! assert_eq!(failures, 3);
//! # });
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backoff::Backoff;
use crate::error::WaitError;

/// Cancellation signal and optional deadline for a [`Waiter::wait`] call.
///
/// Cloning shares the underlying token, so cancelling any clone interrupts
/// every wait using it.
#[derive(Debug, Clone, Default)]
pub struct WaitContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl WaitContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing cancellation token.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Interrupt waits that would run past `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Interrupt waits that would run past `timeout` from now.
    ///
    /// A timeout too large to represent as an instant leaves the context
    /// without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Cancel every wait using this context (or any clone of it).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true if the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Sleeps for whatever its calculator suggests.
///
/// Calculator errors are returned immediately without sleeping. An interrupted
/// wait leaves the calculator's state as it was after the `next` call.
#[derive(Debug)]
pub struct Waiter<B> {
    backoff: B,
}

impl<B: Backoff> Waiter<B> {
    /// Wrap a calculator.
    pub fn new(backoff: B) -> Self {
        Self { backoff }
    }

    /// Borrow the wrapped calculator.
    pub fn backoff(&self) -> &B {
        &self.backoff
    }

    /// Unwrap the calculator.
    pub fn into_inner(self) -> B {
        self.backoff
    }

    /// Ask the calculator for the next wait and sleep for it.
    ///
    /// Returns [`WaitError::Backoff`] if the calculator refused,
    /// [`WaitError::Cancelled`] or [`WaitError::DeadlineExceeded`] if `ctx`
    /// fired first. An already-cancelled context wins even over a zero wait.
    pub async fn wait(&self, ctx: &WaitContext, reset: bool) -> Result<(), WaitError> {
        let delay = self.backoff.next(reset)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(?delay, reset, "waiting before next attempt");

        let deadline = async {
            match ctx.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = ctx.token.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!(?delay, "wait cancelled");
                Err(WaitError::Cancelled)
            }
            _ = deadline => {
                #[cfg(feature = "tracing")]
                tracing::debug!(?delay, "wait deadline exceeded");
                Err(WaitError::DeadlineExceeded)
            }
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
