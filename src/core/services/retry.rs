//! Retry with exponential backoff
//!
//! Paging-style publishers retry transient delivery errors. The policy is
//! owned by each publisher; the engine never retries publishing.

use std::time::Duration;

/// What to do after one delivery attempt
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Delivered
    Done(T),
    /// Transient error, try again after backing off
    Retry(E),
    /// Permanent error, give up now
    Abort(E),
}

/// Exponential backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least one
    pub attempts: u32,
    /// Delay after the first failed attempt; doubles each time
    pub base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    #[must_use]
    pub fn new(attempts: u32, base: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base,
        }
    }

    /// A policy that never retries
    #[must_use]
    pub const fn once() -> Self {
        Self {
            attempts: 1,
            base: Duration::ZERO,
        }
    }

    /// Delay after failed attempt number `attempt` (zero-based)
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op`, sleeping between retries
    pub fn execute<T, E>(&self, op: impl FnMut(u32) -> Attempt<T, E>) -> Result<T, E> {
        self.execute_with(std::thread::sleep, op)
    }

    /// Run `op` with a custom sleep function
    ///
    /// The last error is returned once attempts are exhausted.
    pub fn execute_with<T, E>(
        &self,
        mut sleep: impl FnMut(Duration),
        mut op: impl FnMut(u32) -> Attempt<T, E>,
    ) -> Result<T, E> {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Attempt::Done(value) => return Ok(value),
                Attempt::Abort(err) => return Err(err),
                Attempt::Retry(err) => {
                    if attempt + 1 >= attempts {
                        return Err(err);
                    }
                    let delay = self.delay(attempt);
                    log::debug!("Attempt {} failed, retrying in {delay:?}", attempt + 1);
                    sleep(delay);
                    attempt += 1;
                },
            }
        }
    }
}
