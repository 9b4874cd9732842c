#![allow(unused)]

use crate::task::Id;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Method {
    Insert,
    Resume,
    Link,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Insert { id: Id },
    Resume { id: Id },
    Link { parent: Id, child: Id },
    Release { id: Id },
}

/// Records arena and scheduler calls so tests can assert on what the *real*
/// implementation did, instead of mocking it.
#[derive(Debug, Clone)]
pub(crate) struct Tracker {
    calls: Arc<DashMap<Method, Vec<Call>>>,
}

impl Tracker {
    pub(crate) fn new() -> Self {
        let map = DashMap::new();
        map.insert(Method::Insert, Vec::new());
        map.insert(Method::Resume, Vec::new());
        map.insert(Method::Link, Vec::new());
        map.insert(Method::Release, Vec::new());

        Self {
            calls: Arc::new(map),
        }
    }

    pub(crate) fn record(&self, method: Method, call: Call) {
        self.calls
            .get_mut(&method)
            .expect("method not found")
            .push(call)
    }

    pub(crate) fn get_calls(&self, method: &Method) -> Vec<Call> {
        self.calls
            .get(method)
            .expect("method not found")
            .value()
            .clone()
    }

    pub(crate) fn num_calls(&self, method: &Method) -> usize {
        self.calls.get(method).map_or(0, |calls| calls.len())
    }

    /// How many times `id` shows up for `method`.
    pub(crate) fn count_for(&self, method: &Method, id: Id) -> usize {
        self.get_calls(method)
            .iter()
            .filter(|call| match call {
                Call::Insert { id: got }
                | Call::Resume { id: got }
                | Call::Release { id: got } => *got == id,
                Call::Link { child, .. } => *child == id,
            })
            .count()
    }
}
