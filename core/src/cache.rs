//! Explicit memoization keyed by call parameters
//!
//! Loaded volumes and rendered slices are cached for the whole session:
//! entries are immutable once computed, live for the process lifetime, and
//! are never evicted (the intended datasets are small enough that unbounded
//! growth is acceptable). Values are handed out as [`Arc`] clones so callers
//! can hold results without borrowing the cache.

use crate::error::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Map from a composite key to a computed, immutable result
#[derive(Debug)]
pub struct Memo<K, V> {
    entries: HashMap<K, Arc<V>>,
}

impl<K: Eq + Hash, V> Memo<K, V> {
    /// Creates an empty memo map
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached value for a key, if present
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).cloned()
    }

    /// Returns the cached value for a key, computing and storing it on miss
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(compute()))
            .clone()
    }

    /// Fallible variant of [`Memo::get_or_insert_with`]
    ///
    /// Errors are returned to the caller and NOT cached, so a load that
    /// failed because a file was missing can succeed once the file appears.
    pub fn try_get_or_insert_with(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<V>,
    ) -> Result<Arc<V>> {
        if let Some(value) = self.entries.get(&key) {
            return Ok(value.clone());
        }
        let value = Arc::new(compute()?);
        self.entries.insert(key, value.clone());
        Ok(value)
    }
}

impl<K: Eq + Hash, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
