//! A single-threaded cooperative runtime for nested tasks.
//!
//! A [`Task`] wraps a future. Awaiting a task inside another task's body
//! suspends the parent until the child completes and hands the child's output
//! back as the await value. A [`Scheduler`] owns any number of independent
//! task trees and advances each one by exactly one step per sweep.
//!
//! ```
//! use tasktree::{Scheduler, Task, yield_now};
//!
//! let mut scheduler = Scheduler::new();
//!
//! let handle = scheduler.spawn(Task::new(async {
//!     let child = Task::new(async {
//!         yield_now().await;
//!         "hello"
//!     });
//!     child.await.map(|s| s.len())
//! }));
//!
//! scheduler.run_until_complete();
//! assert_eq!(handle.try_join(), Some(Ok(Ok(5))));
//! ```

mod context;

mod error;
pub use error::{ChannelError, TaskError};

pub mod runtime;
pub use runtime::{Builder, Scheduler, UnhandledPanic};

pub mod task;
pub use task::{Awaiter, Id, JoinHandle, ResultChannel, Task, YieldNow, try_id, yield_now};

mod utils;

#[cfg(test)]
mod test_utils;
