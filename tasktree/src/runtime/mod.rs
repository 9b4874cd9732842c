// Public API
pub mod builder;
pub use builder::{Builder, UnhandledPanic};

pub mod scheduler;
pub use scheduler::Scheduler;

// Exports
pub(crate) use builder::SchedulerConfig;
