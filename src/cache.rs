//! Freshness tracking for remote collections.
//!
//! The cache does not hold data; each collection keeps its own last page.
//! It holds a generation per resource, bumped by `invalidate`. A collection
//! whose data was fetched at an older generation is stale and refetches on
//! its next read.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Files,
    FilePages(String),
}

#[derive(Clone, Default)]
pub struct QueryCache {
    generations: Arc<RwLock<HashMap<ResourceKey, u64>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self, key: &ResourceKey) -> u64 {
        self.generations.read().get(key).copied().unwrap_or(0)
    }

    pub fn invalidate(&self, key: ResourceKey) {
        tracing::debug!("Invalidating {:?}", key);
        *self.generations.write().entry(key).or_insert(0) += 1;
    }

    pub fn is_fresh(&self, key: &ResourceKey, fetched_at: u64) -> bool {
        self.generation(key) == fetched_at
    }
}
