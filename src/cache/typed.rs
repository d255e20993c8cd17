//! Named, typed Moka cache handle.

use std::hash::Hash;
use std::sync::Arc;

use moka::sync::Cache;

use super::CacheConfig;

/// Moka caches are reference counted, so clones share entries.
pub struct TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Cache<K, V>,
    name: Arc<str>,
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        let name = name.into();
        let builder = Cache::builder()
            .name(&name)
            .max_capacity(config.max_capacity);
        let builder = match config.ttl {
            Some(ttl) => builder.time_to_live(ttl),
            None => builder,
        };
        let entries = match config.tti {
            Some(tti) => builder.time_to_idle(tti).build(),
            None => builder.build(),
        };

        Self { entries, name }
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// `None` when missing or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key)
    }

    /// Drop `key`, returning the value it held.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.invalidate(key);
    }
}

impl<K, V> Clone for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<K, V> std::fmt::Debug for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("name", &self.name)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
