use crate::context::{self, Current};
use crate::error::{TaskError, panic_payload_as_str};
use crate::runtime::{Builder, SchedulerConfig, UnhandledPanic};
use crate::task::{Arena, Body, Continuation, Id, JoinHandle, Key, Payload, Task};
#[cfg(test)]
use crate::utils::tracker::Tracker;
use crate::utils::tracker::{Call, Method};
use futures::task::noop_waker_ref;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::task::{Context, Poll};

/// Outcome of resuming one continuation exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The body awaited a task, now linked as its child.
    Awaiting(Key),
    Yielded,
    /// Ran to its terminal point, or panicked.
    Completed,
}

/// What a frontier slot becomes after its tree advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    /// The tree deepened, the slot follows the new child.
    Descend(Key),
    /// The tree yielded at this continuation, which may be an ancestor of the
    /// one the slot pointed at if completions bubbled up.
    Park(Key),
    /// The root completed, the tree is gone.
    Collapse,
}

/// Round-robin driver for a set of independent task trees, on the current
/// thread.
///
/// Every sweep ([`resume_pass`]) resumes the frontier of each live tree
/// exactly once: the deepest continuation that has not resolved yet. When a
/// continuation completes, its parent is resumed within the same sweep, and so
/// on up the tree, until some continuation suspends again or the root
/// completes. A tree of depth `D` therefore needs `D` sweeps to collapse.
///
/// There is no preemption. A body that never awaits nor yields starves every
/// other tree.
///
/// [`resume_pass`]: Scheduler::resume_pass
pub struct Scheduler {
    cfg: SchedulerConfig,

    /// Shared with task bodies through the thread-local context so an awaiter
    /// can insert and link its child.
    arena: Rc<RefCell<Arena>>,

    /// One slot per live tree. Removal swaps with the last slot, so the order
    /// is not stable across sweeps.
    frontier: Vec<Key>,

    /// Panics of root tasks under [`UnhandledPanic::Propagate`].
    faults: Vec<TaskError>,

    sweeps: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Builder::new().build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn with_config(cfg: SchedulerConfig) -> Self {
        Self {
            arena: Rc::new(RefCell::new(Arena::with_capacity(cfg.arena_capacity))),
            frontier: Vec::with_capacity(cfg.frontier_capacity),
            faults: Vec::new(),
            sweeps: 0,
            cfg,
        }
    }

    /// Takes ownership of `task` as the root of a new tree. The body first
    /// runs on the next sweep.
    pub fn schedule<T: 'static>(&mut self, task: Task<T>) {
        self.add_root(task.into_continuation());
    }

    /// Like [`schedule`](Scheduler::schedule), but keeps a handle to read the
    /// root's result once the tree collapsed.
    pub fn spawn<T: 'static>(&mut self, task: Task<T>) -> JoinHandle<T> {
        let handle = JoinHandle::new(task.id(), task.channel());
        self.schedule(task);
        handle
    }

    fn add_root(&mut self, continuation: Continuation) {
        let id = continuation.id;
        let key = self.arena.borrow_mut().insert(continuation);
        self.frontier.push(key);

        tracing::debug!(id = %id, key, trees = self.frontier.len(), "scheduled");
    }

    /// Runs one sweep. Returns `true` once no tree is left.
    pub fn resume_pass(&mut self) -> bool {
        self.sweeps += 1;

        let mut i = 0;
        while i < self.frontier.len() {
            match self.advance(self.frontier[i]) {
                Advance::Descend(key) | Advance::Park(key) => {
                    self.frontier[i] = key;
                    i += 1;
                }
                Advance::Collapse => {
                    // The former last slot lands on `i` and still gets its
                    // resume this sweep.
                    self.frontier.swap_remove(i);
                    tracing::debug!(trees = self.frontier.len(), "tree collapsed");
                }
            }
        }

        self.frontier.is_empty()
    }

    /// Sweeps until every tree collapsed and returns how many sweeps it took.
    pub fn run_until_complete(&mut self) -> u64 {
        let mut sweeps = 0;
        while !self.frontier.is_empty() {
            self.resume_pass();
            sweeps += 1;
        }
        sweeps
    }

    /// Resumes the continuation at `key`, then keeps resuming parents for as
    /// long as continuations complete.
    fn advance(&mut self, mut key: Key) -> Advance {
        loop {
            match self.resume(key) {
                Step::Awaiting(child) => {
                    tracing::trace!(key, child, "descending");
                    return Advance::Descend(child);
                }
                Step::Yielded => return Advance::Park(key),
                Step::Completed => {
                    let released = self.arena.borrow_mut().release(key);
                    let (parent, orphan) = released
                        .as_ref()
                        .map_or((None, None), |c| (c.parent, c.child));

                    // Linked during the final poll and never resumed.
                    if let Some(orphan) = orphan {
                        let orphan = self.arena.borrow_mut().release(orphan);
                        drop(orphan);
                    }
                    drop(released);

                    let Some(parent) = parent else {
                        return Advance::Collapse;
                    };

                    if let Some(record) = self.arena.borrow_mut().get_mut(parent) {
                        record.child = None;
                    }
                    key = parent;
                }
            }
        }
    }

    fn resume(&mut self, key: Key) -> Step {
        let (id, mut body) = {
            let mut arena = self.arena.borrow_mut();
            let Some(continuation) = arena.get_mut(key) else {
                debug_assert!(false, "frontier points at released continuation {key}");
                return Step::Completed;
            };

            let id = continuation.id;
            let Some(body) = continuation.start_resume() else {
                return Step::Completed;
            };

            arena.track(Method::Resume, Call::Resume { id });
            (id, body)
        };

        let _span = tracing::trace_span!("resume", id = %id, key).entered();

        let poll = {
            let _guard = context::enter(Current {
                arena: Rc::clone(&self.arena),
                key,
                id,
            });

            let mut cx = Context::from_waker(noop_waker_ref());
            panic::catch_unwind(AssertUnwindSafe(|| poll_body(&mut body, &mut cx)))
        };

        match poll {
            Ok(Poll::Pending) => {
                let mut arena = self.arena.borrow_mut();
                let continuation = &mut arena[key];
                continuation.suspend(body);

                match continuation.child {
                    Some(child) => Step::Awaiting(child),
                    None => {
                        tracing::trace!("yielded");
                        Step::Yielded
                    }
                }
            }
            Ok(Poll::Ready(payload)) => {
                drop(body);
                self.arena.borrow_mut()[key].complete(Ok(payload));
                tracing::trace!("completed");
                Step::Completed
            }
            Err(panic) => {
                let message = panic_payload_as_str(panic.as_ref());
                drop(body);
                self.unhandled_panic(key, id, message);
                Step::Completed
            }
        }
    }

    fn unhandled_panic(&mut self, key: Key, id: Id, message: String) {
        let err = TaskError::Panicked { id, message };
        tracing::error!(id = %id, error = %err, "task panicked");

        let is_root = {
            let mut arena = self.arena.borrow_mut();
            let continuation = &mut arena[key];
            continuation.complete(Err(err.clone()));
            continuation.parent.is_none()
        };

        if self.cfg.unhandled_panic == UnhandledPanic::Abort {
            std::process::abort();
        }

        if is_root {
            self.faults.push(err);
        }
    }

    /// Number of live trees.
    pub fn len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Number of continuation records currently held, across all trees.
    pub fn live_continuations(&self) -> usize {
        self.arena.borrow().len()
    }

    /// Total number of sweeps run so far.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Drains the errors of root tasks that panicked.
    pub fn take_faults(&mut self) -> Vec<TaskError> {
        std::mem::take(&mut self.faults)
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> Tracker {
        self.arena.borrow().tracker.clone()
    }
}

fn poll_body(body: &mut Body, cx: &mut Context<'_>) -> Poll<Payload> {
    body.as_mut().poll(cx)
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Bodies are dropped after the arena borrow ends.
        let pending = self.arena.borrow_mut().drain();
        if !pending.is_empty() {
            tracing::debug!(count = pending.len(), "dropping unfinished tasks");
        }
        drop(pending);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("cfg", &self.cfg)
            .field("trees", &self.frontier.len())
            .field("continuations", &self.live_continuations())
            .field("sweeps", &self.sweeps)
            .finish()
    }
}
