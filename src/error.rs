use std::time::Duration;

use thiserror::Error;

/// Why a retried operation gave up.
///
/// Every terminal failure of the retry loop is exactly one of these kinds, so
/// callers can match on it to decide what to do next.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The time budget ran out before another attempt could start.
    ///
    /// This is a budget decision rather than an operation failure, so no
    /// underlying error is attached.
    #[error("operation aborted: timeout of {timeout:?} reached after {tries} tries")]
    Timeout {
        /// Attempts made before the deadline was noticed.
        tries: u32,
        /// The configured time budget.
        timeout: Duration,
    },
    /// Every attempt failed with a retryable error until the budget was spent.
    #[error("operation aborted: too many errors (tries {tries} >= {max_tries})")]
    Exhausted {
        /// Attempts made, including the first one.
        tries: u32,
        /// The configured attempt budget.
        max_tries: u32,
        /// The error returned by the last attempt.
        #[source]
        source: E,
    },
    /// The operation failed with an error that is not retryable. Display and
    /// `source` are forwarded to the original error.
    #[error(transparent)]
    Propagated(E),
}

impl<E> RetryError<E> {
    /// Returns `true` if the time budget ran out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::Timeout { .. })
    }

    /// Returns `true` if the attempt budget was spent.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Returns `true` if a non-retryable error was handed through.
    pub fn is_propagated(&self) -> bool {
        matches!(self, RetryError::Propagated(_))
    }

    /// Number of attempts made, if known.
    pub fn tries(&self) -> Option<u32> {
        match self {
            RetryError::Timeout { tries, .. } | RetryError::Exhausted { tries, .. } => Some(*tries),
            RetryError::Propagated(_) => None,
        }
    }

    /// The error returned by the operation, if the loop ended on one.
    pub fn inner(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Propagated(source) => Some(source),
            RetryError::Timeout { .. } => None,
        }
    }

    /// Consumes the retry error, returning the operation's error if there is one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Propagated(source) => Some(source),
            RetryError::Timeout { .. } => None,
        }
    }
}
