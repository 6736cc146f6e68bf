use crate::config::CacheConfig;
use crate::core::Result;
use lru::LruCache;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

struct Slot<V> {
    inserted_at: Instant,
    cell: Arc<OnceCell<V>>,
}

/// LRU cache whose entries also expire a fixed time after being written.
///
/// Each key owns a single-initialization cell. Concurrent callers racing on
/// an unset key all wait on the same cell, so the initializer runs once per
/// residency. A failed initializer leaves nothing behind.
pub struct ExpiringCache<K, V> {
    entries: Mutex<LruCache<K, Slot<V>>>,
    ttl: Duration,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
        }
    }

    /// Returns the cached value for `key`, running `init` only when no live
    /// entry exists.
    pub async fn get_or_try_init<F, Fut>(&self, key: K, init: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = self.slot(&key)?;
        match cell.get_or_try_init(init).await {
            Ok(value) => Ok(value.clone()),
            Err(err) => {
                self.discard_failed(&key, &cell)?;
                Err(err)
            }
        }
    }

    /// Live, initialized value for `key`, if any.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let mut entries = self.entries.lock()?;
        Ok(entries
            .get(key)
            .filter(|slot| slot.inserted_at.elapsed() < self.ttl)
            .and_then(|slot| slot.cell.get().cloned()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, key: &K) -> Result<Arc<OnceCell<V>>> {
        let mut entries = self.entries.lock()?;
        if let Some(slot) = entries.get(key) {
            if slot.inserted_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&slot.cell));
            }
        }
        let cell = Arc::new(OnceCell::new());
        entries.put(
            key.clone(),
            Slot {
                inserted_at: Instant::now(),
                cell: Arc::clone(&cell),
            },
        );
        Ok(cell)
    }

    fn discard_failed(&self, key: &K, cell: &Arc<OnceCell<V>>) -> Result<()> {
        let mut entries = self.entries.lock()?;
        let same_empty_slot = entries
            .peek(key)
            .is_some_and(|slot| Arc::ptr_eq(&slot.cell, cell) && !slot.cell.initialized());
        if same_empty_slot {
            entries.pop(key);
        }
        Ok(())
    }
}
