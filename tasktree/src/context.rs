//! Thread-local view of the continuation currently being resumed.
//!
//! The scheduler enters the context around every poll. Task bodies cannot
//! reach the scheduler directly, so this is how an awaiter finds the arena to
//! insert the awaited task into and the key of the parent to link it to.

use crate::task::Id;
use crate::task::{Arena, Key};
use crate::utils::ScopeGuard;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
pub(crate) struct Current {
    pub(crate) arena: Rc<RefCell<Arena>>,
    pub(crate) key: Key,
    pub(crate) id: Id,
}

thread_local! {
    static CURRENT: RefCell<Option<Current>> = const { RefCell::new(None) };
}

/// Marks `current` as running until the returned guard drops, then restores
/// whatever was running before. Restoring lets a body drive a nested
/// scheduler of its own.
#[must_use]
pub(crate) fn enter(current: Current) -> ScopeGuard<'static, impl FnOnce()> {
    let prev = CURRENT.with(|c| c.replace(Some(current)));

    ScopeGuard::new(move || {
        CURRENT.with(|c| c.replace(prev));
    })
}

pub(crate) fn with_current<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Current) -> R,
{
    // Clone out of the cell so `f` can enter a nested context.
    let current = CURRENT.with(|c| c.borrow().clone())?;
    Some(f(&current))
}

pub(crate) fn current_task_id() -> Option<Id> {
    CURRENT.with(|c| c.borrow().as_ref().map(|current| current.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(arena: &Rc<RefCell<Arena>>, key: Key) -> Current {
        Current {
            arena: Rc::clone(arena),
            key,
            id: Id::next(),
        }
    }

    #[test]
    fn test_enter_restores_previous() {
        let arena = Rc::new(RefCell::new(Arena::with_capacity(0)));
        assert!(current_task_id().is_none());

        let outer = current(&arena, 0);
        let outer_id = outer.id;
        {
            let _outer = enter(outer);
            assert_eq!(current_task_id(), Some(outer_id));

            let inner = current(&arena, 1);
            let inner_id = inner.id;
            {
                let _inner = enter(inner);
                assert_eq!(current_task_id(), Some(inner_id));
                assert_eq!(with_current(|c| c.key), Some(1));
            }

            assert_eq!(current_task_id(), Some(outer_id));
        }

        assert!(current_task_id().is_none());
        assert!(with_current(|c| c.key).is_none());
    }
}
