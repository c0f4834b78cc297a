//! # Schema Resolver
//!
//! Memoizing front of the [`FragmentStore`]. Both outcomes of a lookup are
//! cached: the parsed fragment, and "no fragment" for actions without one.
//! Parse failures are returned to the caller and not cached, so a fixed
//! file is picked up on the next request.
//!
//! ## Concurrency
//!
//! The cache lock is held only around the map lookup and the insert, never
//! across file I/O or parsing. Two threads missing on the same action may
//! both parse the file; the later insert wins and both values are equal.

use std::collections::HashMap;
use std::sync::Arc;

use apispec_core::{ActionId, Fragment};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::SchemaError;
use crate::parse::load_fragment;
use crate::store::FragmentStore;

type CacheEntry = Option<Arc<Fragment>>;

/// Cached lookup of the fragment for an action.
#[derive(Debug)]
pub struct SchemaResolver {
    store: FragmentStore,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl SchemaResolver {
    pub fn new(store: FragmentStore) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    /// Fragment for `id`, or `None` when no file exists for it.
    pub fn resolve(&self, id: &ActionId) -> Result<Option<Arc<Fragment>>, SchemaError> {
        let key = id.key();

        if let Some(entry) = self.cache.read().get(&key) {
            debug!(action = %key, found = entry.is_some(), "fragment cache hit");
            return Ok(entry.clone());
        }

        let entry = match self.store.find(id) {
            Some(path) => {
                debug!(action = %key, path = %path.display(), "loading fragment");
                load_fragment(&path)?.map(Arc::new)
            }
            None => {
                debug!(action = %key, "no fragment for action");
                None
            }
        };

        self.cache.write().insert(key, entry.clone());
        Ok(entry)
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Drop the cached entry for one action.
    pub fn invalidate(&self, id: &ActionId) {
        self.cache.write().remove(&id.key());
    }

    /// Number of cached entries, hits and misses alike.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}
