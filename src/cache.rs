use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Process-wide LRU cache filled lazily by an async loader.
///
/// Concurrent misses on the same key may both run the loader; the last
/// result wins. Failed loads are never cached.
pub struct ReadThroughCache<V> {
    cache: Arc<Mutex<LruCache<String, V>>>,
}

impl<V> Clone for ReadThroughCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<V: Clone> ReadThroughCache<V> {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, loading it on a miss.
    pub async fn get_or_load<F, Fut, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        debug!("Cache miss for {}", key);
        let value = load().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}

/// Icon and portrait bytes keyed by asset path.
pub type AssetCache = ReadThroughCache<Arc<Vec<u8>>>;
