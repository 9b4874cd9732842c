use crate::task::continuation::{Continuation, Key};
#[cfg(test)]
use crate::utils::tracker::Tracker;
use crate::utils::tracker::{Call, Method};
use slab::Slab;
use std::ops::{Index, IndexMut};

/// Owns every scheduled continuation record. Records reference each other by
/// slab key, never by pointer, so releasing a record cannot leave a dangling
/// parent or child.
pub(crate) struct Arena {
    slab: Slab<Continuation>,

    #[cfg(test)]
    pub(crate) tracker: Tracker,
}

impl Arena {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),

            #[cfg(test)]
            tracker: Tracker::new(),
        }
    }

    pub(crate) fn insert(&mut self, continuation: Continuation) -> Key {
        self.track(Method::Insert, Call::Insert {
            id: continuation.id,
        });
        self.slab.insert(continuation)
    }

    pub(crate) fn get(&self, key: Key) -> Option<&Continuation> {
        self.slab.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut Continuation> {
        self.slab.get_mut(key)
    }

    /// Records that `parent` is now suspended on `child`. This is the only
    /// place `parent`/`child` links are set.
    pub(crate) fn link(&mut self, parent: Key, child: Key) {
        debug_assert!(self[parent].child.is_none());
        debug_assert!(self[child].parent.is_none());

        self[parent].child = Some(child);
        self[child].parent = Some(parent);

        tracing::trace!(parent = %self[parent].id, child = %self[child].id, "linked");
        self.track(Method::Link, Call::Link {
            parent: self[parent].id,
            child: self[child].id,
        });
    }

    /// Frees a record and returns it. The caller decides when the returned
    /// value (and the body it may still hold) is dropped.
    pub(crate) fn release(&mut self, key: Key) -> Option<Continuation> {
        let continuation = self.slab.try_remove(key)?;

        tracing::trace!(id = %continuation.id, state = ?continuation.state, "released");
        self.track(Method::Release, Call::Release {
            id: continuation.id,
        });
        Some(continuation)
    }

    pub(crate) fn len(&self) -> usize {
        self.slab.len()
    }

    /// Removes every record without dropping them, so the bodies can be
    /// dropped once the arena is no longer borrowed.
    pub(crate) fn drain(&mut self) -> Vec<Continuation> {
        self.slab.drain().collect()
    }

    #[allow(unused)]
    #[inline(always)]
    pub(crate) fn track(&self, method: Method, call: Call) {
        #[cfg(test)]
        self.tracker.record(method, call);
    }
}

impl Index<Key> for Arena {
    type Output = Continuation;

    fn index(&self, key: Key) -> &Self::Output {
        &self.slab[key]
    }
}

impl IndexMut<Key> for Arena {
    fn index_mut(&mut self, key: Key) -> &mut Self::Output {
        &mut self.slab[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Id;
    use crate::task::channel::Payload;

    fn continuation() -> Continuation {
        Continuation::new(Id::next(), Box::pin(async { Payload::new(()) }))
    }

    #[test]
    fn test_link_and_release() {
        let mut arena = Arena::with_capacity(4);
        let parent = arena.insert(continuation());
        let child = arena.insert(continuation());
        assert_eq!(arena.len(), 2);

        arena.link(parent, child);
        assert_eq!(arena[parent].child, Some(child));
        assert_eq!(arena[child].parent, Some(parent));
        assert_eq!(arena.tracker.num_calls(&Method::Link), 1);

        let released = arena.release(child).expect("child is live");
        assert_eq!(released.parent, Some(parent));
        assert!(arena.get(child).is_none());
        assert!(arena.release(child).is_none());

        assert_eq!(arena.len(), 1);
        assert_eq!(arena.tracker.num_calls(&Method::Release), 1);
    }

    #[test]
    fn test_drain() {
        let mut arena = Arena::with_capacity(0);
        (0..3).for_each(|_| {
            arena.insert(continuation());
        });

        assert_eq!(arena.drain().len(), 3);
        assert_eq!(arena.len(), 0);
    }
}
