use std::time::Duration;

use super::action::{Action, Operation};
use super::condition::{AnyError, Condition};
use super::error::RetryError;
use super::executor;
use super::future::RetryFuture;

/// Time budget used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Attempt budget used when none is configured.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Configurable retry policy.
///
/// Implements `Default`, which allows up to 3 attempts within 15 seconds,
/// treats every error as retryable and does not sleep between attempts.
///
/// # Example
///
/// ```rust
/// # use std::time::Duration;
/// # use fixed_retry::RetryConfig;
/// #
/// # fn main() {
/// let config = RetryConfig::default()
///     .with_max_tries(5)
///     .with_sleep(Duration::from_millis(1));
///
/// let mut calls = 0;
/// let result = config.execute(|| {
///     calls += 1;
///     if calls < 3 { Err("not yet") } else { Ok(calls) }
/// });
/// #
/// # assert_eq!(result, Ok(3));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig<C = AnyError> {
    timeout: Duration,
    max_tries: u32,
    sleep: Duration,
    condition: C,
}

impl Default for RetryConfig {
    fn default() -> RetryConfig {
        RetryConfig {
            timeout: DEFAULT_TIMEOUT,
            max_tries: DEFAULT_MAX_TRIES,
            sleep: Duration::ZERO,
            condition: AnyError,
        }
    }
}

impl RetryConfig {
    /// Creates a configuration holding the defaults.
    pub fn new() -> RetryConfig {
        RetryConfig::default()
    }
}

impl<C> RetryConfig<C> {
    /// Sets the time budget for the whole retry loop.
    ///
    /// The deadline is only checked before an attempt starts. An attempt that
    /// is already running is never interrupted, and a sleep entered just
    /// before the deadline is always served in full.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of times the operation is invoked, counting
    /// the first attempt. A value of 0 is treated as 1.
    pub fn with_max_tries(mut self, tries: u32) -> Self {
        self.max_tries = tries.max(1);
        self
    }

    /// Sets the fixed delay between a failed, retryable attempt and the next.
    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    /// Replaces the predicate deciding which errors are retryable.
    pub fn with_condition<C2>(self, condition: C2) -> RetryConfig<C2> {
        RetryConfig {
            timeout: self.timeout,
            max_tries: self.max_tries,
            sleep: self.sleep,
            condition,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    pub fn sleep(&self) -> Duration {
        self.sleep
    }

    pub fn condition(&self) -> &C {
        &self.condition
    }

    /// Run the given operation on the current thread, retrying it on failure.
    ///
    /// Sleeps between attempts block the thread.
    pub fn execute<T, E, O>(&self, operation: O) -> Result<T, RetryError<E>>
    where
        O: Operation<T, E>,
        C: Condition<E>,
    {
        executor::execute(self, operation)
    }

    /// Run the given action as a future, retrying it on failure.
    pub fn retry<A>(&self, action: A) -> RetryFuture<A, C>
    where
        A: Action,
        C: Condition<A::Error> + Clone,
    {
        RetryFuture::new(self, action)
    }
}

#[test]
fn defaults() {
    let config = RetryConfig::new();

    assert_eq!(config.timeout(), Duration::from_secs(15));
    assert_eq!(config.max_tries(), 3);
    assert_eq!(config.sleep(), Duration::ZERO);
    assert!(config.condition().is_retryable(&"anything"));
}

#[test]
fn setters_change_one_field_each() {
    let config = RetryConfig::default().with_sleep(Duration::from_millis(250));

    assert_eq!(config.sleep(), Duration::from_millis(250));
    assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    assert_eq!(config.max_tries(), DEFAULT_MAX_TRIES);

    let config = config
        .with_timeout(Duration::from_secs(1))
        .with_condition(|e: &u32| *e != 0);

    assert_eq!(config.timeout(), Duration::from_secs(1));
    assert_eq!(config.sleep(), Duration::from_millis(250));
    assert!(!config.condition().is_retryable(&0));
}

#[test]
fn zero_max_tries_means_one() {
    assert_eq!(RetryConfig::default().with_max_tries(0).max_tries(), 1);
}
