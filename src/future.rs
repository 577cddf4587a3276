use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures_timer::Delay;
use tracing::{debug, trace};

use super::action::Action;
use super::condition::Condition;
use super::config::RetryConfig;
use super::error::RetryError;

enum RetryState<F> {
    Checking,
    Running(Pin<Box<F>>),
    Sleeping(Delay),
    Done,
}

/// Future that drives multiple attempts at an action under a `RetryConfig`.
///
/// This is the non-blocking counterpart of `RetryConfig::execute`: the same
/// deadline check before each attempt, the same attempt counting, but the
/// delay between attempts is a timer instead of a blocked thread.
///
/// The clock starts the first time the future is polled. Like the
/// blocking loop it is only consulted between attempts, so an attempt in
/// flight is always awaited to completion.
pub struct RetryFuture<A, C>
where
    A: Action,
{
    action: A,
    condition: C,
    timeout: Duration,
    max_tries: u32,
    sleep: Duration,
    started: Option<Instant>,
    tries: u32,
    state: RetryState<A::Future>,
}

// Neither the action nor the condition is ever pinned; attempt futures are boxed.
impl<A, C> Unpin for RetryFuture<A, C> where A: Action {}

impl<A, C> RetryFuture<A, C>
where
    A: Action,
    C: Condition<A::Error>,
{
    /// Creates a new retry future. No attempt is made until it is polled.
    pub fn new(config: &RetryConfig<C>, action: A) -> RetryFuture<A, C>
    where
        C: Clone,
    {
        RetryFuture {
            action,
            condition: config.condition().clone(),
            timeout: config.timeout(),
            max_tries: config.max_tries(),
            sleep: config.sleep(),
            started: None,
            tries: 0,
            state: RetryState::Checking,
        }
    }

    fn failed(&mut self, err: A::Error) -> Option<RetryError<A::Error>> {
        if !self.condition.is_retryable(&err) {
            debug!(tries = self.tries, "action failed with a non-retryable error");
            return Some(RetryError::Propagated(err));
        }

        if self.tries >= self.max_tries {
            debug!(tries = self.tries, max_tries = self.max_tries, "retries exhausted");
            return Some(RetryError::Exhausted {
                tries: self.tries,
                max_tries: self.max_tries,
                source: err,
            });
        }

        self.state = if self.sleep > Duration::ZERO {
            trace!(
                tries = self.tries,
                sleep_ms = self.sleep.as_millis() as u64,
                "sleeping before next attempt"
            );
            RetryState::Sleeping(Delay::new(self.sleep))
        } else {
            RetryState::Checking
        };
        None
    }
}

impl<A: Action, C> fmt::Debug for RetryFuture<A, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RetryFuture")
            .field("tries", &self.tries)
            .field("max_tries", &self.max_tries)
            .finish()
    }
}

impl<A, C> Future for RetryFuture<A, C>
where
    A: Action,
    C: Condition<A::Error>,
{
    type Output = Result<A::Item, RetryError<A::Error>>;

    fn poll(self: Pin<&mut Self>, ctx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let timeout = this.timeout;
        let started = *this.started.get_or_insert_with(Instant::now);

        loop {
            match &mut this.state {
                RetryState::Checking => {
                    if started.elapsed() >= timeout {
                        debug!(
                            tries = this.tries,
                            timeout_ms = timeout.as_millis() as u64,
                            "retry timeout reached"
                        );
                        this.state = RetryState::Done;
                        return Poll::Ready(Err(RetryError::Timeout {
                            tries: this.tries,
                            timeout,
                        }));
                    }

                    this.tries += 1;
                    trace!(tries = this.tries, max_tries = this.max_tries, "attempting action");
                    this.state = RetryState::Running(Box::pin(this.action.run()));
                }
                RetryState::Running(future) => {
                    let poll = future.as_mut().poll(ctx);
                    let err = match poll {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(Ok(item)) => {
                            this.state = RetryState::Done;
                            return Poll::Ready(Ok(item));
                        }
                        Poll::Ready(Err(err)) => err,
                    };
                    if let Some(err) = this.failed(err) {
                        this.state = RetryState::Done;
                        return Poll::Ready(Err(err));
                    }
                }
                RetryState::Sleeping(delay) => match Pin::new(delay).poll(ctx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(()) => this.state = RetryState::Checking,
                },
                RetryState::Done => panic!("RetryFuture polled after completion"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{RetryConfig, RetryError};
    use std::time::{Duration, Instant};

    use futures::executor::block_on;
    use futures::future::{join, Either};
    use futures_timer::Delay;

    #[test]
    fn attempts_just_once() {
        let config = RetryConfig::default().with_max_tries(1);
        let mut num_calls = 0;
        let res = {
            let fut = config.retry(|| {
                num_calls += 1;
                async { Err::<(), u64>(42) }
            });
            block_on(fut)
        };

        assert_eq!(
            res,
            Err(RetryError::Exhausted {
                tries: 1,
                max_tries: 1,
                source: 42,
            })
        );
        assert_eq!(num_calls, 1);
    }

    #[test]
    fn attempts_until_max_tries_reached() {
        let config = RetryConfig::default().with_sleep(Duration::from_millis(10));
        let mut num_calls = 0;
        let res = {
            let fut = config.retry(|| {
                num_calls += 1;
                async { Err::<(), u64>(42) }
            });
            block_on(fut)
        };

        assert_eq!(res.unwrap_err().tries(), Some(3));
        assert_eq!(num_calls, 3);
    }

    #[test]
    fn attempts_until_success() {
        let config = RetryConfig::default().with_max_tries(5);
        let mut num_calls = 0;
        let res = {
            let fut = config.retry(|| {
                num_calls += 1;
                if num_calls < 4 {
                    Either::Left(async { Err::<(), u64>(42) })
                } else {
                    Either::Right(async { Ok::<(), u64>(()) })
                }
            });
            block_on(fut)
        };

        assert_eq!(res, Ok(()));
        assert_eq!(num_calls, 4);
    }

    #[test]
    fn attempts_retry_only_if_given_condition_is_true() {
        let config = RetryConfig::default()
            .with_max_tries(5)
            .with_condition(|e: &u64| *e < 3);
        let mut num_calls = 0;
        let res = {
            let action = || {
                num_calls += 1;
                async move { Err::<(), u64>(num_calls) }
            };
            block_on(config.retry(action))
        };

        assert_eq!(res, Err(RetryError::Propagated(3)));
        assert_eq!(num_calls, 3);
    }

    #[test]
    fn zero_timeout_never_runs_the_action() {
        let config = RetryConfig::default().with_timeout(Duration::ZERO);
        let mut num_calls = 0;
        let res = {
            let fut = config.retry(|| {
                num_calls += 1;
                async { Ok::<(), u64>(()) }
            });
            block_on(fut)
        };

        assert!(res.unwrap_err().is_timeout());
        assert_eq!(num_calls, 0);
    }

    #[test]
    fn waits_for_sleep_between_attempts() {
        let sleep = Duration::from_millis(30);
        let config = RetryConfig::default().with_sleep(sleep);
        let mut num_calls = 0;
        let start = Instant::now();
        let res = {
            let fut = config.retry(|| {
                num_calls += 1;
                if num_calls < 3 {
                    Either::Left(async { Err::<(), u64>(42) })
                } else {
                    Either::Right(async { Ok::<(), u64>(()) })
                }
            });
            block_on(fut)
        };

        assert_eq!(res, Ok(()));
        assert_eq!(num_calls, 3);
        assert!(start.elapsed() >= sleep * 2);
    }

    #[test]
    fn in_flight_attempt_outlives_the_deadline() {
        let config = RetryConfig::default()
            .with_max_tries(10)
            .with_timeout(Duration::from_millis(20));
        let mut num_calls = 0;
        let res = {
            let fut = config.retry(|| {
                num_calls += 1;
                async {
                    Delay::new(Duration::from_millis(50)).await;
                    Err::<(), u64>(42)
                }
            });
            block_on(fut)
        };

        let err = res.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.tries(), Some(1));
        assert_eq!(num_calls, 1);
    }

    #[test]
    fn concurrent_futures_keep_their_own_counts() {
        let short = RetryConfig::default()
            .with_max_tries(2)
            .with_sleep(Duration::from_millis(5));
        let long = RetryConfig::default()
            .with_max_tries(6)
            .with_sleep(Duration::from_millis(1));
        let (mut short_calls, mut long_calls) = (0, 0);
        let (a, b) = {
            let a = short.retry(|| {
                short_calls += 1;
                async { Err::<(), &str>("short") }
            });
            let b = long.retry(|| {
                long_calls += 1;
                async { Err::<(), &str>("long") }
            });
            block_on(join(a, b))
        };

        assert_eq!(a.unwrap_err().tries(), Some(2));
        assert_eq!(b.unwrap_err().tries(), Some(6));
        assert_eq!(short_calls, 2);
        assert_eq!(long_calls, 6);
    }
}
