use crate::task::Id;
use std::any::Any;

/// Errors surfaced to the code awaiting a task, or collected by the scheduler
/// when a root task fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task body panicked while being resumed. The body was dropped and
    /// never produced a value.
    #[error("task {id} panicked: {message}")]
    Panicked { id: Id, message: String },

    /// A task was awaited while no scheduler sweep was resuming the caller.
    #[error("a task can only be awaited from inside a scheduled task body")]
    NoScheduler,

    /// The awaiting body is already suspended on another task. A continuation
    /// has at most one active child.
    #[error("task {parent} is already awaiting another task")]
    AlreadyAwaiting { parent: Id },

    #[error("result channel error: {0}")]
    Channel(#[from] ChannelError),
}

impl TaskError {
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked { .. })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("result channel is empty")]
    Empty,

    #[error("result channel already holds a value")]
    AlreadyStored,

    #[error("result channel holds a `{stored}`, cannot extract a `{expected}`")]
    TypeMismatch {
        expected: &'static str,
        stored: &'static str,
    },

    #[error("result channel value was already extracted")]
    Taken,
}

pub(crate) fn panic_payload_as_str(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn test_panic_payload_as_str() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_payload_as_str(payload.as_ref()), "boom");

        let payload = panic::catch_unwind(|| panic!("boom {}", 42)).unwrap_err();
        assert_eq!(panic_payload_as_str(payload.as_ref()), "boom 42");

        let payload = panic::catch_unwind(|| panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_payload_as_str(payload.as_ref()), "Box<dyn Any>");
    }

    #[test]
    fn test_channel_error_converts_into_task_error() {
        let err: TaskError = ChannelError::Taken.into();
        assert_eq!(err, TaskError::Channel(ChannelError::Taken));
        assert!(!err.is_panic());
    }
}
