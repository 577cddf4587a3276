//! This library retries fallible operations with a flat, fixed delay,
//! bounded by an attempt budget and a soft time budget.
//!
//! Operations can be plain blocking closures, driven on the current thread
//! by [`RetryConfig::execute`], or actions producing futures, driven by the
//! [`RetryFuture`] returned from [`RetryConfig::retry`]. Both follow the
//! same loop:
//!
//! 1. give up with [`RetryError::Timeout`] if the time budget is spent,
//! 2. invoke the operation and return its item on success,
//! 3. hand a non-retryable error back as [`RetryError::Propagated`],
//! 4. give up with [`RetryError::Exhausted`] once the attempt budget is spent,
//! 5. otherwise sleep for the configured delay and start over.
//!
//! The time budget is only checked before an attempt. A running attempt is
//! never cancelled, so a slow operation can overshoot the timeout.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fixed_retry::{RetryConfig, RetryError};
//!
//! #[derive(Debug, PartialEq)]
//! enum FetchError {
//!     Unavailable,
//!     NotFound,
//! }
//!
//! fn main() {
//!     let config = RetryConfig::default()
//!         .with_timeout(Duration::from_secs(2))
//!         .with_sleep(Duration::from_millis(5))
//!         .with_condition(|e: &FetchError| *e == FetchError::Unavailable);
//!
//!     let result = config.execute(|| Err::<(), _>(FetchError::NotFound));
//!     assert_eq!(result, Err(RetryError::Propagated(FetchError::NotFound)));
//!
//!     let result = config.execute(|| Err::<(), _>(FetchError::Unavailable));
//!     assert!(result.unwrap_err().is_exhausted());
//! }
//! ```

mod action;
mod condition;
mod config;
mod error;
mod executor;
mod future;

pub use action::{Action, Operation};
pub use condition::{AnyError, Condition};
pub use config::{RetryConfig, DEFAULT_MAX_TRIES, DEFAULT_TIMEOUT};
pub use error::RetryError;
pub use executor::execute;
pub use future::RetryFuture;
