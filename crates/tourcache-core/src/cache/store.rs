use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CachedData;
use crate::clock::Clock;

type Slot<V> = Arc<Mutex<Option<CachedData<Arc<V>>>>>;

/// Keyed TTL cache with single-flight refresh.
///
/// Each key owns an async mutex. The first caller that finds the entry
/// missing or expired refreshes it while holding the lock; concurrent callers
/// for the same key wait and then reuse the fresh entry instead of issuing
/// their own upstream request. Entries are replaced wholesale.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slots: StdMutex<HashMap<K, Slot<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Send + Sync,
{
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            slots: StdMutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The slot for `key`. Adding a new key first drops expired slots that
    /// no caller is holding, so caller-chosen keys cannot grow the map forever.
    fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(key) {
            return slot.clone();
        }

        let now = self.clock.now();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|c| c.is_fresh(self.ttl, now)),
                Err(_) => true,
            }
        });
        if slots.len() != before {
            debug!(cache = self.name, evicted = before - slots.len(), "Evicted expired entries");
        }

        slots.entry(key.clone()).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Return the fresh entry for `key`, or run `refresh` and store its result.
    pub async fn get_or_refresh<F, Fut, E>(&self, key: K, refresh: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: fmt::Display,
    {
        self.get_or_refresh_with(key, |_| true, false, refresh).await
    }

    /// Like `get_or_refresh`, with an extra payload validity check and an
    /// optional fallback to the previous payload when the refresh fails.
    pub async fn get_or_refresh_with<F, Fut, E, P>(
        &self,
        key: K,
        is_valid: P,
        serve_stale_on_error: bool,
        refresh: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: fmt::Display,
        P: Fn(&V) -> bool,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;
        let now = self.clock.now();

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(self.ttl, now) && is_valid(&cached.data) {
                debug!(cache = self.name, key = ?key, "Cache hit");
                return Ok(cached.data.clone());
            }
        }

        debug!(cache = self.name, key = ?key, "Cache miss, refreshing");
        match refresh().await {
            Ok(data) => {
                let data = Arc::new(data);
                *entry = Some(CachedData::new(data.clone(), now));
                Ok(data)
            }
            Err(e) => match entry.as_ref() {
                Some(stale) if serve_stale_on_error => {
                    warn!(
                        cache = self.name,
                        key = ?key,
                        error = %e,
                        age = %stale.age_display(now),
                        "Refresh failed, serving stale entry"
                    );
                    Ok(stale.data.clone())
                }
                _ => Err(e),
            },
        }
    }

    /// Current entry without refreshing. Returns `None` while a refresh holds the slot.
    pub fn peek(&self, key: &K) -> Option<CachedData<Arc<V>>> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(key).cloned()
        }?;
        let entry = slot.try_lock().ok()?;
        entry.clone()
    }
}
