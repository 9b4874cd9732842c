use crate::context;
use crate::error::TaskError;
use crate::task::continuation::Continuation;
use crate::task::{ResultChannel, Task};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

enum Link {
    /// Not polled yet, the awaiter still owns the child.
    Unlinked(Continuation),

    /// The child moved into the arena and the parent is suspended on it.
    Linked(ResultChannel),

    Done,
}

/// Future returned by awaiting a [`Task`].
///
/// The first poll hands the child over to the arena of the running scheduler
/// and links it under the task currently being resumed, then suspends. The
/// scheduler only resumes the parent again once the child chain has fully
/// completed, at which point the next poll extracts the child's result.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Awaiter<T> {
    link: Link,
    _p: PhantomData<fn() -> T>,
}

impl<T: 'static> Awaiter<T> {
    pub(crate) fn new(task: Task<T>) -> Self {
        Self {
            link: Link::Unlinked(task.into_continuation()),
            _p: PhantomData,
        }
    }
}

impl<T: 'static> Future for Awaiter<T> {
    type Output = crate::task::Result<T>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match std::mem::replace(&mut this.link, Link::Done) {
            Link::Unlinked(child) => {
                let channel = child.channel.clone();

                let linked = context::with_current(move |current| {
                    let mut arena = current.arena.borrow_mut();

                    if arena
                        .get(current.key)
                        .is_some_and(|parent| parent.child.is_some())
                    {
                        let err = TaskError::AlreadyAwaiting { parent: current.id };
                        return Err((err, child));
                    }

                    let key = arena.insert(child);
                    arena.link(current.key, key);
                    Ok(())
                });

                match linked {
                    Some(Ok(())) => {
                        this.link = Link::Linked(channel);
                        Poll::Pending
                    }
                    Some(Err((err, child))) => {
                        // Dropped once the arena is no longer borrowed.
                        drop(child);
                        Poll::Ready(Err(err))
                    }
                    None => Poll::Ready(Err(TaskError::NoScheduler)),
                }
            }
            Link::Linked(channel) => {
                if channel.is_ready() {
                    Poll::Ready(channel.extract::<T>())
                } else {
                    this.link = Link::Linked(channel);
                    Poll::Pending
                }
            }
            Link::Done => panic!("`Awaiter` polled after completion"),
        }
    }
}

impl<T> fmt::Debug for Awaiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let link = match &self.link {
            Link::Unlinked(child) => format!("Unlinked({})", child.id),
            Link::Linked(channel) => format!("Linked({:?})", channel),
            Link::Done => "Done".to_string(),
        };
        f.debug_tuple("Awaiter").field(&link).finish()
    }
}
