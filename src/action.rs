use std::future::Future;

/// A blocking operation that can be invoked any number of times.
///
/// Nothing is done to compensate for side effects left behind by a failed
/// attempt; the operation has to be safe to call again.
pub trait Operation<T, E> {
    /// Invoke the operation once.
    fn call(&mut self) -> Result<T, E>;
}

impl<T, E, F: FnMut() -> Result<T, E>> Operation<T, E> for F {
    fn call(&mut self) -> Result<T, E> {
        self()
    }
}

/// An action can be run multiple times and produces a fresh future per run.
pub trait Action {
    /// The future that this action produces.
    type Future: Future<Output = Result<Self::Item, Self::Error>>;
    /// The item that the future may resolve with.
    type Item;
    /// The error that the future may resolve with.
    type Error;

    /// Run this action, returning a future for a single attempt.
    fn run(&mut self) -> Self::Future;
}

impl<I, E, T, F> Action for F
where
    T: Future<Output = Result<I, E>>,
    F: FnMut() -> T,
{
    type Item = I;
    type Error = E;
    type Future = T;

    fn run(&mut self) -> Self::Future {
        self()
    }
}
