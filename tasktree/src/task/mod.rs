// Public API
mod awaiter;
pub use self::awaiter::Awaiter;

mod channel;
pub use self::channel::ResultChannel;
pub(crate) use self::channel::Payload;

pub mod id;
pub use self::id::{Id, try_id};

mod join;
pub use self::join::JoinHandle;

#[allow(clippy::module_inception)]
mod task;
pub use self::task::Task;

mod yield_now;
pub use self::yield_now::{YieldNow, yield_now};

// Internals
mod arena;
pub(crate) use self::arena::Arena;

mod continuation;
pub(crate) use self::continuation::{Body, Continuation, Key};

/// Value produced by awaiting a task.
pub type Result<T> = std::result::Result<T, crate::error::TaskError>;
