use crate::runtime::Scheduler;

/// Initial room in the frontier collection, one slot per task tree.
const FRONTIER_CAPACITY: usize = 16;

/// Initial room in the arena, one record per live continuation.
const ARENA_CAPACITY: usize = 64;

/// What to do when a task body panics.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledPanic {
    /// Log the panic and abort the whole process. The panicking task is
    /// marked completed first, but nothing observes it.
    #[default]
    Abort,

    /// The panicking task completes with [`TaskError::Panicked`]. An awaiting
    /// parent receives the error as its await value and decides what to do
    /// with it. A root task records the error in
    /// [`Scheduler::take_faults`].
    ///
    /// [`TaskError::Panicked`]: crate::TaskError::Panicked
    Propagate,
}

#[derive(Debug, Clone)]
pub(crate) struct SchedulerConfig {
    pub(crate) frontier_capacity: usize,
    pub(crate) arena_capacity: usize,
    pub(crate) unhandled_panic: UnhandledPanic,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Builder::new().cfg
    }
}

/// Builds a [`Scheduler`] with custom settings.
///
/// None of the settings are limits: capacities only pre-allocate.
///
/// ```
/// use tasktree::{Builder, UnhandledPanic};
///
/// let scheduler = Builder::new()
///     .frontier_capacity(4)
///     .unhandled_panic(UnhandledPanic::Propagate)
///     .build();
///
/// assert!(scheduler.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    cfg: SchedulerConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            cfg: SchedulerConfig {
                frontier_capacity: FRONTIER_CAPACITY,
                arena_capacity: ARENA_CAPACITY,
                unhandled_panic: UnhandledPanic::default(),
            },
        }
    }

    /// Number of task trees to make room for up front.
    pub fn frontier_capacity(mut self, val: usize) -> Self {
        self.cfg.frontier_capacity = val;
        self
    }

    /// Number of continuations, across all trees, to make room for up front.
    pub fn arena_capacity(mut self, val: usize) -> Self {
        self.cfg.arena_capacity = val;
        self
    }

    pub fn unhandled_panic(mut self, val: UnhandledPanic) -> Self {
        self.cfg.unhandled_panic = val;
        self
    }

    pub fn build(self) -> Scheduler {
        Scheduler::with_config(self.cfg)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.frontier_capacity, FRONTIER_CAPACITY);
        assert_eq!(cfg.arena_capacity, ARENA_CAPACITY);
        assert_eq!(cfg.unhandled_panic, UnhandledPanic::Abort);
    }

    #[test]
    fn test_overrides() {
        let builder = Builder::new()
            .frontier_capacity(1)
            .arena_capacity(2)
            .unhandled_panic(UnhandledPanic::Propagate);

        assert_eq!(builder.cfg.frontier_capacity, 1);
        assert_eq!(builder.cfg.arena_capacity, 2);
        assert_eq!(builder.cfg.unhandled_panic, UnhandledPanic::Propagate);
    }
}
