use std::marker::PhantomData;

/// Runs a closure when it goes out of scope, whether the scope is left by a
/// normal return or by a panic unwinding through it.
///
/// The scheduler relies on this to restore the thread-local context after
/// polling a task body, including when the body panics.
pub(crate) struct ScopeGuard<'a, F: FnOnce()> {
    // Taken on drop so the closure runs at most once.
    closure: Option<F>,

    _p: PhantomData<&'a ()>,
}

impl<'a, F: FnOnce()> ScopeGuard<'a, F> {
    pub(crate) fn new(closure: F) -> Self {
        ScopeGuard {
            closure: Some(closure),
            _p: PhantomData,
        }
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<'_, F> {
    fn drop(&mut self) {
        if let Some(closure) = self.closure.take() {
            closure();
        }
    }
}
