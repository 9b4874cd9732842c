use crate::task::{Id, ResultChannel};
use std::fmt;
use std::marker::PhantomData;

/// Read access to the result of a root task handed to
/// [`Scheduler::spawn`](crate::runtime::Scheduler::spawn).
///
/// Root tasks have no awaiting parent, so this is the only way to observe what
/// they produced. Dropping the handle does not affect the task.
pub struct JoinHandle<T> {
    id: Id,
    channel: ResultChannel,
    _p: PhantomData<fn() -> T>,
}

impl<T: 'static> JoinHandle<T> {
    pub(crate) fn new(id: Id, channel: ResultChannel) -> Self {
        Self {
            id,
            channel,
            _p: PhantomData,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// True once the task completed, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.channel.is_ready()
    }

    /// Takes the task output, or `None` while the task is still running. The
    /// output can only be taken once. Later calls return a
    /// [`ChannelError::Taken`](crate::ChannelError::Taken) error.
    pub fn try_join(&self) -> Option<crate::task::Result<T>> {
        self.is_finished().then(|| self.channel.extract::<T>())
    }
}

impl<T> fmt::Debug for JoinHandle<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("JoinHandle")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}
