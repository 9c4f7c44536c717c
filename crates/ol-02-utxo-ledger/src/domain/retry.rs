//! Bounded retry for store mutations
//!
//! The loop always terminates after `max_attempts` calls. Errors that say
//! the operation can never succeed abort immediately instead of burning the
//! remaining attempts.
//!
//! ```text
//! attempt 1 ──fail(retryable)──→ attempt 2 ──fail──→ ... ──→ Exhausted
//!     │                              │
//!     ├── ok ──→ Ok(value)           └── fail(permanent) ──→ Aborted
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::error::StoreError;

/// Classifies an error as worth another attempt or not
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Conflicts on already-spent or repeated inputs are permanent for a given
/// transaction; every other store error only aborts the current attempt.
impl Retryable for StoreError {
    fn is_retryable(&self) -> bool {
        !matches!(
            self,
            StoreError::AlreadySpent { .. } | StoreError::DuplicateInput(_)
        )
    }
}

/// Why a retried operation finally failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError<E: fmt::Display> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("aborted on attempt {attempt}: {error}")]
    Aborted { attempt: u32, error: E },
}

impl<E: fmt::Display> RetryError<E> {
    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempt, .. } => *attempt,
        }
    }

    /// The last error observed
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted { error, .. } => error,
        }
    }
}

/// Fixed attempt ceiling with optional exponential backoff
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each one after
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, E, F>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Retryable + fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => {
                    return Err(RetryError::Aborted { attempt, error });
                }
                Err(error) if attempt >= max_attempts => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
                Err(error) => {
                    warn!(attempt, max_attempts, error = %error, "Attempt failed, retrying");
                    let delay = self.delay_before(attempt + 1);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Backoff applied before `attempt` (1-based)
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.base_delay_ms == 0 {
            return Duration::ZERO;
        }
        let factor = 2u64.saturating_pow(attempt - 2);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}
