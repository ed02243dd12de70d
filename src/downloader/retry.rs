//! Attempt loop bookkeeping.
//!
//! A download moves through the states of [`RetryState`]: it probes once, then
//! makes numbered attempts until one succeeds or the budget runs out. The
//! [`RetryPolicy`] is the pure part of that loop. Given the number of the
//! attempt that just ended and its [`AttemptVerdict`], it returns the
//! [`Transition`] to take, including how long to wait before the next
//! attempt. Sleeping and the attempts themselves are left to the
//! [`Downloader`](super::Downloader).
//!
//! Backoff is plain exponential: `backoff * 2^(attempt - 1)`, without jitter
//! or cap.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use stubborn::downloader::retry::RetryPolicy;
//!
//! let policy = RetryPolicy::new(4, Duration::from_secs(1));
//! assert_eq!(policy.delay_for(1), Duration::from_secs(1));
//! assert_eq!(policy.delay_for(2), Duration::from_secs(2));
//! assert_eq!(policy.delay_for(3), Duration::from_secs(4));
//! ```

use crate::error::Error;
use std::time::Duration;

/// Attempts made when nothing else is configured.
pub const DEFAULT_RETRIES: u32 = 5;

/// Base backoff when nothing else is configured.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(1500);

/// Smallest base backoff accepted.
pub const MIN_BACKOFF: Duration = Duration::from_millis(100);

/// How an attempt that needs no retry ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Body bytes were transferred and the file is now complete.
    Transferred,
    /// The file was complete before any body bytes were requested.
    AlreadyComplete,
    /// The server answered `416 Range Not Satisfiable` to a file that already
    /// has the announced size.
    ConfirmedByServer,
}

/// Result of one attempt, as seen by the policy.
#[derive(Debug)]
pub enum AttemptVerdict {
    /// Nothing left to do.
    Complete(Completion),
    /// The attempt failed.
    Failed(Error),
}

/// What to do after an attempt.
#[derive(Debug)]
pub enum Transition {
    /// Stop: the download is complete.
    Succeed(Completion),
    /// Wait for `delay`, then make attempt number `attempt`.
    Retry {
        /// Number of the next attempt.
        attempt: u32,
        /// Pause before it.
        delay: Duration,
        /// Failure of the attempt that just ended.
        error: Error,
    },
    /// Stop: the download failed.
    Fail(Error),
}

/// States of a download.
#[derive(Debug)]
pub enum RetryState {
    /// Learning the expected size. Runs once.
    Probing,
    /// Running attempt number `attempt`.
    Attempting {
        /// Attempt number, starting at 1.
        attempt: u32,
    },
    /// Terminal: the file is complete.
    Succeeded(Completion),
    /// Terminal: the download failed.
    Failed(Error),
}

impl RetryState {
    /// Whether the state machine has stopped.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded(_) | RetryState::Failed(_))
    }

    /// State entered once the probe is done, whatever its outcome.
    pub fn after_probe() -> Self {
        RetryState::Attempting { attempt: 1 }
    }
}

impl From<Transition> for RetryState {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Succeed(completion) => RetryState::Succeeded(completion),
            Transition::Retry { attempt, .. } => RetryState::Attempting { attempt },
            Transition::Fail(error) => RetryState::Failed(error),
        }
    }
}

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, at least 1.
    max_attempts: u32,
    /// Pause after the first failed attempt, at least [`MIN_BACKOFF`].
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_BACKOFF)
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` is raised to 1 and `backoff` to
    /// [`MIN_BACKOFF`] if they are smaller.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: backoff.max(MIN_BACKOFF),
        }
    }

    /// Creates a policy from loosely typed options, such as command-line values.
    ///
    /// `retries` is clamped to at least 1, `backoff_sec` to at least 0.1
    /// seconds (a NaN counts as 0.1).
    pub fn from_options(retries: i64, backoff_sec: f64) -> Self {
        let max_attempts = u32::try_from(retries.max(1)).unwrap_or(u32::MAX);
        let backoff = Duration::try_from_secs_f64(backoff_sec.max(0.1)).unwrap_or(Duration::MAX);
        Self::new(max_attempts, backoff)
    }

    /// Maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base backoff.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Pause after failed attempt number `attempt`: `backoff * 2^(attempt - 1)`.
    ///
    /// Saturates at [`Duration::MAX`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.backoff.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// Decide what follows attempt number `attempt`.
    pub fn next(&self, attempt: u32, verdict: AttemptVerdict) -> Transition {
        match verdict {
            AttemptVerdict::Complete(completion) => Transition::Succeed(completion),
            AttemptVerdict::Failed(error) if !error.is_retryable() => Transition::Fail(error),
            AttemptVerdict::Failed(error) if attempt >= self.max_attempts => {
                Transition::Fail(Error::Exhausted {
                    attempts: attempt,
                    source: Box::new(error),
                })
            }
            AttemptVerdict::Failed(error) => Transition::Retry {
                attempt: attempt + 1,
                delay: self.delay_for(attempt),
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> AttemptVerdict {
        AttemptVerdict::Failed(Error::Incomplete {
            expected: 10,
            actual: 3,
        })
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.backoff(), Duration::from_millis(1500));
    }

    #[test]
    fn test_clamping() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.backoff(), MIN_BACKOFF);

        let policy = RetryPolicy::from_options(-3, 0.01);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.backoff(), MIN_BACKOFF);

        let policy = RetryPolicy::from_options(7, f64::NAN);
        assert_eq!(policy.max_attempts(), 7);
        assert_eq!(policy.backoff(), MIN_BACKOFF);

        let policy = RetryPolicy::from_options(i64::MAX, 2.5);
        assert_eq!(policy.max_attempts(), u32::MAX);
        assert_eq!(policy.backoff(), Duration::from_millis(2500));
    }

    #[test]
    fn test_exponential_schedule_without_cap() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100));
        let delays: Vec<_> = (1..=5).map(|n| policy.delay_for(n)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(1600),
            ]
        );
        assert_eq!(policy.delay_for(21), Duration::from_millis(100 * (1 << 20)));
    }

    #[test]
    fn test_schedule_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1));
        assert_eq!(policy.delay_for(40), Duration::MAX);
        assert_eq!(
            RetryPolicy::from_options(3, f64::INFINITY).delay_for(2),
            Duration::MAX
        );
    }

    #[test]
    fn test_two_failures_then_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));

        let Transition::Retry { attempt, delay, .. } = policy.next(1, transient()) else {
            panic!("first failure must be retried");
        };
        assert_eq!((attempt, delay), (2, Duration::from_millis(250)));

        let Transition::Retry { attempt, delay, .. } = policy.next(2, transient()) else {
            panic!("second failure must be retried");
        };
        assert_eq!((attempt, delay), (3, Duration::from_millis(500)));

        assert!(matches!(
            policy.next(3, AttemptVerdict::Complete(Completion::Transferred)),
            Transition::Succeed(Completion::Transferred)
        ));
    }

    #[test]
    fn test_single_attempt_budget_fails_without_retry() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1));
        match policy.next(1, transient()) {
            Transition::Fail(error) => {
                assert!(error.to_string().contains("1 attempts"), "{error}");
                assert!(matches!(error, Error::Exhausted { attempts: 1, .. }));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_non_retryable_failure_is_not_wrapped() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        let verdict = AttemptVerdict::Failed(Error::InvalidUrl("nope".into()));
        assert!(matches!(
            policy.next(1, verdict),
            Transition::Fail(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_success_signals_end_the_loop() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1));
        for completion in [
            Completion::Transferred,
            Completion::AlreadyComplete,
            Completion::ConfirmedByServer,
        ] {
            let state = RetryState::from(policy.next(1, AttemptVerdict::Complete(completion)));
            assert!(state.is_terminal());
            assert!(matches!(state, RetryState::Succeeded(c) if c == completion));
        }
    }

    #[test]
    fn test_state_transitions() {
        assert!(!RetryState::Probing.is_terminal());
        assert!(matches!(
            RetryState::after_probe(),
            RetryState::Attempting { attempt: 1 }
        ));

        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        let state = RetryState::from(policy.next(1, transient()));
        assert!(matches!(state, RetryState::Attempting { attempt: 2 }));
        assert!(!state.is_terminal());

        let state = RetryState::from(policy.next(2, transient()));
        assert!(matches!(state, RetryState::Failed(Error::Exhausted { attempts: 2, .. })));
    }
}
