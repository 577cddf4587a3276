/// Decides whether a failed attempt may be followed by another one.
///
/// Implementations must be pure: the executor may ask about the same error
/// value any number of times.
pub trait Condition<E> {
    /// Returns `true` if `error` is worth another attempt.
    fn is_retryable(&self, error: &E) -> bool;
}

impl<E, F: Fn(&E) -> bool> Condition<E> for F {
    fn is_retryable(&self, error: &E) -> bool {
        self(error)
    }
}

/// Treats every error as retryable. This is the default condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyError;

impl<E> Condition<E> for AnyError {
    fn is_retryable(&self, _error: &E) -> bool {
        true
    }
}

#[test]
fn any_error_retries_everything() {
    assert!(AnyError.is_retryable(&"boom"));
    assert!(AnyError.is_retryable(&42u64));
}

#[test]
fn closures_are_conditions() {
    let transient = |e: &u64| *e >= 500;

    assert!(transient.is_retryable(&503u64));
    assert!(!transient.is_retryable(&404u64));
    // callable repeatedly with the same answer
    assert!(!transient.is_retryable(&404u64));
}
