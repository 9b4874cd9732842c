use crate::error::{ChannelError, TaskError};
use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A type-erased value together with the name of its concrete type, used for
/// diagnostics when a caller extracts at the wrong type.
pub(crate) struct Payload {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl Payload {
    pub(crate) fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }
}

#[derive(Default)]
enum Slot {
    #[default]
    Empty,
    Stored(Payload),
    Failed(TaskError),
    Taken,
}

/// Shared cell holding the completion value of a task.
///
/// The completed child writes it exactly once and the awaiting parent (or a
/// [`JoinHandle`]) reads it exactly once. Clones share the same cell. The cell
/// is not thread-safe: tasks never leave the thread running the scheduler.
///
/// Extraction is checked. Asking for the wrong type returns
/// [`ChannelError::TypeMismatch`] and leaves the value in place.
///
/// [`JoinHandle`]: crate::task::JoinHandle
#[derive(Clone, Default)]
pub struct ResultChannel {
    slot: Rc<RefCell<Slot>>,
}

impl ResultChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`. Fails if anything, value or failure, was stored before.
    pub fn store<T: 'static>(&self, value: T) -> Result<(), ChannelError> {
        self.fill(Slot::Stored(Payload::new(value)))
    }

    pub(crate) fn store_payload(&self, payload: Payload) -> Result<(), ChannelError> {
        self.fill(Slot::Stored(payload))
    }

    pub(crate) fn fail(&self, err: TaskError) -> Result<(), ChannelError> {
        self.fill(Slot::Failed(err))
    }

    fn fill(&self, next: Slot) -> Result<(), ChannelError> {
        let mut slot = self.slot.borrow_mut();
        match *slot {
            Slot::Empty => {
                *slot = next;
                Ok(())
            }
            _ => Err(ChannelError::AlreadyStored),
        }
    }

    /// Takes the stored value out as a `T`.
    pub fn extract<T: 'static>(&self) -> Result<T, TaskError> {
        let mut slot = self.slot.borrow_mut();

        match std::mem::take(&mut *slot) {
            Slot::Empty => Err(ChannelError::Empty.into()),
            Slot::Taken => {
                *slot = Slot::Taken;
                Err(ChannelError::Taken.into())
            }
            Slot::Failed(err) => {
                *slot = Slot::Taken;
                Err(err)
            }
            Slot::Stored(Payload { value, type_name }) => match value.downcast::<T>() {
                Ok(value) => {
                    *slot = Slot::Taken;
                    Ok(*value)
                }
                Err(value) => {
                    *slot = Slot::Stored(Payload { value, type_name });
                    Err(ChannelError::TypeMismatch {
                        expected: std::any::type_name::<T>(),
                        stored: type_name,
                    }
                    .into())
                }
            },
        }
    }

    /// True once a value or a failure was stored, even if already extracted.
    pub fn is_ready(&self) -> bool {
        !matches!(*self.slot.borrow(), Slot::Empty)
    }
}

impl fmt::Debug for ResultChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot.borrow() {
            Slot::Empty => "Empty",
            Slot::Stored(p) => p.type_name,
            Slot::Failed(_) => "Failed",
            Slot::Taken => "Taken",
        };
        f.debug_tuple("ResultChannel").field(&state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Id;
    use anyhow::Result;

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        name: String,
        tags: Vec<u8>,
        score: f64,
    }

    #[test]
    fn test_extract_integer() -> Result<()> {
        let channel = ResultChannel::new();
        channel.store(42_i64)?;
        assert_eq!(channel.extract::<i64>()?, 42);
        Ok(())
    }

    #[test]
    fn test_extract_string() -> Result<()> {
        let channel = ResultChannel::new();
        channel.store(String::from("ringing"))?;
        assert_eq!(channel.extract::<String>()?, "ringing");
        Ok(())
    }

    #[test]
    fn test_extract_record() -> Result<()> {
        let record = Record {
            name: "leaf".to_string(),
            tags: vec![1, 2, 3],
            score: 0.5,
        };

        let channel = ResultChannel::new();
        channel.store(record.clone())?;
        assert_eq!(channel.extract::<Record>()?, record);
        Ok(())
    }

    #[test]
    fn test_unit_payload() -> Result<()> {
        let channel = ResultChannel::new();
        channel.store(())?;
        channel.extract::<()>()?;
        Ok(())
    }

    #[test]
    fn test_type_mismatch_keeps_value() -> Result<()> {
        let channel = ResultChannel::new();
        channel.store(7_u32)?;

        let err = channel.extract::<String>().unwrap_err();
        assert!(matches!(
            err,
            TaskError::Channel(ChannelError::TypeMismatch { stored: "u32", .. })
        ));

        assert_eq!(channel.extract::<u32>()?, 7);
        Ok(())
    }

    #[test]
    fn test_store_is_never_overwritten() -> Result<()> {
        let channel = ResultChannel::new();
        assert!(!channel.is_ready());

        channel.store(1_u8)?;
        assert!(channel.is_ready());
        assert_eq!(channel.store(2_u8), Err(ChannelError::AlreadyStored));

        assert_eq!(channel.extract::<u8>()?, 1);

        // Taken is terminal too.
        assert_eq!(channel.store(3_u8), Err(ChannelError::AlreadyStored));
        assert_eq!(
            channel.extract::<u8>(),
            Err(TaskError::Channel(ChannelError::Taken))
        );
        Ok(())
    }

    #[test]
    fn test_empty_and_failed() -> Result<()> {
        let channel = ResultChannel::new();
        assert_eq!(
            channel.extract::<u8>(),
            Err(TaskError::Channel(ChannelError::Empty))
        );

        let err = TaskError::Panicked {
            id: Id::next(),
            message: "boom".to_string(),
        };
        channel.fail(err.clone())?;
        assert!(channel.is_ready());
        assert_eq!(channel.extract::<u8>(), Err(err));
        Ok(())
    }

    #[test]
    fn test_clones_share_the_cell() -> Result<()> {
        let writer = ResultChannel::new();
        let reader = writer.clone();

        writer.store("shared")?;
        assert!(reader.is_ready());
        assert_eq!(reader.extract::<&str>()?, "shared");
        assert!(writer.extract::<&str>().is_err());
        Ok(())
    }
}
