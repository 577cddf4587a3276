use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::action::Operation;
use super::condition::Condition;
use super::config::RetryConfig;
use super::error::RetryError;

/// Runs `operation` until it succeeds, fails with a non-retryable error, uses
/// up `config.max_tries()` attempts or outlives `config.timeout()`.
///
/// The deadline is checked before every attempt, including the first, so a
/// zero timeout never invokes the operation. Running attempts are never
/// interrupted.
pub fn execute<T, E, O, C>(config: &RetryConfig<C>, mut operation: O) -> Result<T, RetryError<E>>
where
    O: Operation<T, E>,
    C: Condition<E>,
{
    let started = Instant::now();
    let mut tries = 0;

    loop {
        if started.elapsed() >= config.timeout() {
            debug!(tries, timeout_ms = config.timeout().as_millis() as u64, "retry timeout reached");
            return Err(RetryError::Timeout {
                tries,
                timeout: config.timeout(),
            });
        }

        tries += 1;
        trace!(tries, max_tries = config.max_tries(), "attempting operation");

        let err = match operation.call() {
            Ok(item) => return Ok(item),
            Err(err) => err,
        };

        if !config.condition().is_retryable(&err) {
            debug!(tries, "operation failed with a non-retryable error");
            return Err(RetryError::Propagated(err));
        }

        if tries >= config.max_tries() {
            debug!(tries, max_tries = config.max_tries(), "retries exhausted");
            return Err(RetryError::Exhausted {
                tries,
                max_tries: config.max_tries(),
                source: err,
            });
        }

        let sleep = config.sleep();
        if sleep > Duration::ZERO {
            trace!(tries, sleep_ms = sleep.as_millis() as u64, "sleeping before next attempt");
            thread::sleep(sleep);
        }
    }
}
