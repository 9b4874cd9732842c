use crate::error::TaskError;
use crate::task::Id;
use crate::task::channel::{Payload, ResultChannel};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Type-erased task body. The typed value is boxed on completion and stored in
/// the result channel.
pub(crate) type Body = Pin<Box<dyn Future<Output = Payload>>>;

/// Stable address of a continuation record inside the [`Arena`].
///
/// [`Arena`]: crate::task::Arena
pub(crate) type Key = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Body never resumed.
    Created,
    /// Body is being polled right now. The body future is out of its record.
    Running,
    /// Body awaited another task, `child` is set.
    SuspendedOnChild,
    /// Body yielded without awaiting anything.
    SuspendedYielded,
    /// Terminal. The result channel is filled.
    Completed,
}

/// Resumable record of one task invocation.
pub(crate) struct Continuation {
    pub(crate) id: Id,

    pub(crate) state: State,

    /// `None` while the body is being polled and after completion.
    body: Option<Body>,

    pub(crate) channel: ResultChannel,

    /// Task this one is suspended on.
    pub(crate) child: Option<Key>,

    /// Task waiting on this one.
    pub(crate) parent: Option<Key>,
}

impl Continuation {
    pub(crate) fn new(id: Id, body: Body) -> Self {
        Self {
            id,
            state: State::Created,
            body: Some(body),
            channel: ResultChannel::new(),
            child: None,
            parent: None,
        }
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.state == State::Completed
    }

    /// Hands the body out for polling and moves to `Running`. Returns `None`
    /// if the record has no body left to run.
    pub(crate) fn start_resume(&mut self) -> Option<Body> {
        let body = self.body.take()?;
        self.state = State::Running;
        Some(body)
    }

    /// Puts the body back after a poll returned `Pending`.
    pub(crate) fn suspend(&mut self, body: Body) {
        debug_assert_eq!(self.state, State::Running);

        self.state = match self.child {
            Some(_) => State::SuspendedOnChild,
            None => State::SuspendedYielded,
        };
        self.body = Some(body);
    }

    /// The Completed transition. Fills the channel exactly once.
    pub(crate) fn complete(&mut self, outcome: Result<Payload, TaskError>) {
        debug_assert!(!self.is_completed(), "task {} completed twice", self.id);

        let stored = match outcome {
            Ok(payload) => self.channel.store_payload(payload),
            Err(err) => self.channel.fail(err),
        };
        debug_assert!(stored.is_ok(), "result channel of {} filled twice", self.id);

        self.state = State::Completed;
        self.body = None;
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("child", &self.child)
            .field("parent", &self.parent)
            .finish()
    }
}

impl Drop for Continuation {
    fn drop(&mut self) {
        if !self.is_completed() {
            tracing::trace!(id = %self.id, state = ?self.state, "tearing down unfinished task");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn continuation() -> Continuation {
        Continuation::new(Id::next(), Box::pin(async { Payload::new(5_u8) }))
    }

    #[test]
    fn test_lifecycle() -> Result<()> {
        let mut cont = continuation();
        assert_eq!(cont.state, State::Created);
        assert!(!cont.channel.is_ready());

        let body = cont.start_resume().expect("fresh record has a body");
        assert_eq!(cont.state, State::Running);
        assert!(cont.start_resume().is_none());

        cont.suspend(body);
        assert_eq!(cont.state, State::SuspendedYielded);

        let _ = cont.start_resume();
        cont.complete(Ok(Payload::new(5_u8)));

        assert!(cont.is_completed());
        assert!(cont.start_resume().is_none());
        assert_eq!(cont.channel.extract::<u8>()?, 5);
        Ok(())
    }

    #[test]
    fn test_suspend_with_child() {
        let mut cont = continuation();
        let body = cont.start_resume().expect("fresh record has a body");

        cont.child = Some(3);
        cont.suspend(body);
        assert_eq!(cont.state, State::SuspendedOnChild);
    }

    #[test]
    fn test_failed_completion() {
        let mut cont = continuation();
        let _ = cont.start_resume();

        let err = TaskError::Panicked {
            id: cont.id,
            message: "boom".to_string(),
        };
        cont.complete(Err(err.clone()));

        assert!(cont.is_completed());
        assert_eq!(cont.channel.extract::<u8>(), Err(err));
    }
}
