use crate::task::{Task, yield_now};
use std::cell::Cell;
use std::rc::Rc;

/// Counts how many of its guards were dropped. Capture a guard in a task body
/// to observe when the body, and everything it owns, is torn down.
#[derive(Debug, Clone, Default)]
pub(crate) struct DropCounter(Rc<Cell<usize>>);

impl DropCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn guard(&self) -> DropGuard {
        DropGuard(Rc::clone(&self.0))
    }

    pub(crate) fn count(&self) -> usize {
        self.0.get()
    }
}

#[derive(Debug)]
pub(crate) struct DropGuard(Rc<Cell<usize>>);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// A chain of `depth` tasks, each awaiting the next. The innermost one returns
/// `leaf`, every other one forwards what it awaited.
pub(crate) fn chain(depth: usize, leaf: u32) -> Task<u32> {
    Task::new(async move {
        if depth <= 1 {
            leaf
        } else {
            chain(depth - 1, leaf).await.expect("inner task failed")
        }
    })
}

/// A task that yields `n` times, then returns `n`.
pub(crate) fn yielding(n: usize) -> Task<usize> {
    Task::new(async move {
        for _ in 0..n {
            yield_now().await;
        }
        n
    })
}
