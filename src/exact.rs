//! Exact-match table for literal routes.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use crate::mapping::RouteMapping;

/// Canonical path → mapping, for one HTTP method.
///
/// Filled while the router is built and read-only afterwards.
#[derive(Debug)]
pub struct ExactRouteTable<H> {
    routes: HashMap<Box<str>, Arc<RouteMapping<H>>>,
}

impl<H> ExactRouteTable<H> {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers `mapping` under `path`. The first registration of a path
    /// wins; returns `false` when `path` was already taken.
    pub fn insert(&mut self, path: &str, mapping: Arc<RouteMapping<H>>) -> bool {
        match self.routes.entry(path.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(mapping);
                true
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&RouteMapping<H>> {
        self.routes.get(path).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Default for ExactRouteTable<H> {
    fn default() -> Self { Self::new() }
}
