use crate::task::awaiter::Awaiter;
use crate::task::channel::Payload;
use crate::task::continuation::Continuation;
use crate::task::{Id, ResultChannel};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;

/// A suspendable unit of sequential computation producing a single `T`.
///
/// A `Task` exclusively owns its continuation. Constructing one never runs the
/// body: nothing happens until the task is handed to a [`Scheduler`] or
/// awaited from inside another task.
///
/// Dropping a `Task` that was neither scheduled nor awaited tears the body
/// down on the spot. No further statement of the body runs.
///
/// ```
/// use tasktree::{Scheduler, Task};
///
/// let leaf = Task::new(async { 40 });
/// let root = Task::new(async move {
///     let v = leaf.await.expect("leaf does not panic");
///     v + 2
/// });
///
/// let mut scheduler = Scheduler::new();
/// let handle = scheduler.spawn(root);
/// scheduler.run_until_complete();
///
/// assert_eq!(handle.try_join(), Some(Ok(42)));
/// ```
///
/// [`Scheduler`]: crate::runtime::Scheduler
#[must_use = "a task does nothing unless scheduled or awaited"]
pub struct Task<T> {
    continuation: Continuation,
    _p: PhantomData<fn() -> T>,
}

impl<T: 'static> Task<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        let body = Box::pin(async move { Payload::new(future.await) });

        Self {
            continuation: Continuation::new(Id::next(), body),
            _p: PhantomData,
        }
    }
}

impl<T> Task<T> {
    pub fn id(&self) -> Id {
        self.continuation.id
    }

    pub(crate) fn channel(&self) -> ResultChannel {
        self.continuation.channel.clone()
    }

    pub(crate) fn into_continuation(self) -> Continuation {
        self.continuation
    }
}

impl<T: 'static> IntoFuture for Task<T> {
    type Output = crate::task::Result<T>;
    type IntoFuture = Awaiter<T>;

    /// Awaiting a task suspends the caller until the task, and every task it
    /// awaits in turn, has completed.
    fn into_future(self) -> Self::IntoFuture {
        Awaiter::new(self)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Task({})", self.id())
    }
}
