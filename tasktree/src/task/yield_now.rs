use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Suspends the current task without awaiting anything. The task is resumed
/// again on the next sweep.
pub fn yield_now() -> YieldNow {
    YieldNow::new()
}

#[derive(Debug, Clone, Copy)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct YieldNow {
    awaiting_first_poll: bool,
}

impl YieldNow {
    pub fn new() -> Self {
        Self {
            awaiting_first_poll: true,
        }
    }
}

impl Default for YieldNow {
    fn default() -> Self {
        Self::new()
    }
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Only yield on first poll. Next time the task is resumed we return.
        if self.awaiting_first_poll {
            self.awaiting_first_poll = false;
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}
