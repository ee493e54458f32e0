//! Bounded in-memory query cache.
//!
//! Replies are keyed by [`CacheKey`] and evicted first-in, first-out once the cache is full.
//! Access recency never changes eviction order. Nothing is persisted; the cache lives as long
//! as the process that built it.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, trace};

use super::types::{CacheKey, CacheStats, CacheStatus};
use crate::constants::DEFAULT_CACHE_CAPACITY;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

impl CacheState {
    /// Inserts under the capacity bound, evicting before inserting. Returns the evicted key.
    fn insert(&mut self, key: CacheKey, value: String, max_entries: usize) -> Option<CacheKey> {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return None;
        }

        let evicted = if self.entries.len() >= max_entries {
            self.order.pop_front()
        } else {
            None
        };
        if let Some(oldest) = &evicted {
            self.entries.remove(oldest);
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
        evicted
    }
}

/// FIFO-bounded memoization of `(model, prompt) -> reply`.
///
/// Check-and-insert runs under a single lock, so the size bound holds at every observation
/// point. The lock is never held while a compute function runs.
pub struct QueryCache {
    state: Mutex<CacheState>,
    inflight: Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
}

impl QueryCache {
    /// Creates a cache with the default capacity (500 entries).
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache holding at most `max_entries` replies (clamped to at least 1).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            inflight: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            insertions: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Returns the cached reply for `(model, prompt)` without touching hit counters.
    pub fn get(&self, model: &str, prompt: &str) -> Option<String> {
        self.peek(&CacheKey::new(model, prompt))
    }

    /// Stores a reply, evicting the oldest-inserted entry if the cache is full.
    ///
    /// Replacing an existing key keeps its original FIFO position. Returns the evicted key.
    pub fn insert(&self, key: CacheKey, value: String) -> Option<CacheKey> {
        let evicted = self.state.lock().insert(key, value, self.max_entries);
        self.record_insert(evicted.as_ref());
        evicted
    }

    /// Returns the cached reply, or runs `compute` and caches its `Ok` value.
    ///
    /// On a hit `compute` is not called. An `Err` from `compute` is returned unchanged and
    /// nothing is cached.
    ///
    /// Concurrent misses on the same key are not coalesced here: each caller runs `compute`,
    /// and the first value stored is the one every caller gets back. Concurrent callers should
    /// use [`QueryCache::get_or_compute_async`], which runs `compute` once per key.
    pub fn get_or_compute<F, E>(&self, model: &str, prompt: &str, compute: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        self.get_or_compute_with_status(model, prompt, compute)
            .map(|(value, _)| value)
    }

    /// Like [`QueryCache::get_or_compute`], also reporting whether the value was cached.
    pub fn get_or_compute_with_status<F, E>(
        &self,
        model: &str,
        prompt: &str,
        compute: F,
    ) -> Result<(String, CacheStatus), E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        let key = CacheKey::new(model, prompt);
        if let Some(value) = self.lookup(&key) {
            return Ok((value, CacheStatus::Hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute()?;
        Ok((self.store(key, value), CacheStatus::Miss))
    }

    /// Async variant of [`QueryCache::get_or_compute`].
    ///
    /// Concurrent misses for the same key are coalesced: the first caller computes while the
    /// others wait and then read its result. If that computation fails nothing is cached and
    /// the next waiter computes on its own.
    pub async fn get_or_compute_async<F, Fut, E>(
        &self,
        model: &str,
        prompt: &str,
        compute: F,
    ) -> Result<(String, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let key = CacheKey::new(model, prompt);
        if let Some(value) = self.lookup(&key) {
            return Ok((value, CacheStatus::Hit));
        }

        let slot = InflightSlot::acquire(self, &key);
        let _permit = slot.gate.lock().await;

        if let Some(value) = self.lookup(&key) {
            return Ok((value, CacheStatus::Hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute().await?;
        Ok((self.store(key.clone(), value), CacheStatus::Miss))
    }

    /// Returns `true` if `(model, prompt)` is cached.
    pub fn contains(&self, model: &str, prompt: &str) -> bool {
        self.state
            .lock()
            .entries
            .contains_key(&CacheKey::new(model, prompt))
    }

    /// Returns the number of cached replies.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Returns the configured maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Clears all entries (counters are kept).
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    /// Returns keys from oldest to newest insertion.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.state.lock().order.iter().cloned().collect()
    }

    /// Returns a snapshot of hit/miss/insert/evict counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.max_entries,
        }
    }

    #[cfg(test)]
    pub(crate) fn inflight_is_empty(&self) -> bool {
        self.inflight.lock().is_empty()
    }

    fn peek(&self, key: &CacheKey) -> Option<String> {
        self.state.lock().entries.get(key).cloned()
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        let value = self.peek(key)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        trace!(key_id = key.short_id(), "query cache hit");
        Some(value)
    }

    /// Inserts a freshly computed value. If another caller stored the key first, that value
    /// wins so every caller observes the same reply.
    fn store(&self, key: CacheKey, value: String) -> String {
        let key_id = key.short_id();
        let evicted = {
            let mut state = self.state.lock();
            if let Some(existing) = state.entries.get(&key) {
                return existing.clone();
            }
            state.insert(key, value.clone(), self.max_entries)
        };
        self.record_insert(evicted.as_ref());
        debug!(key_id, evicted = evicted.is_some(), "query cache store");
        value
    }

    fn record_insert(&self, evicted: Option<&CacheKey>) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
        if let Some(oldest) = evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            trace!(evicted_id = oldest.short_id(), "query cache evicted oldest entry");
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

/// Per-key gate shared by concurrent async misses; unregistered on drop.
struct InflightSlot<'a> {
    cache: &'a QueryCache,
    key: &'a CacheKey,
    gate: Arc<AsyncMutex<()>>,
}

impl<'a> InflightSlot<'a> {
    fn acquire(cache: &'a QueryCache, key: &'a CacheKey) -> Self {
        let gate = cache
            .inflight
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        Self { cache, key, gate }
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        let mut inflight = self.cache.inflight.lock();
        let registered = inflight
            .get(self.key)
            .is_some_and(|gate| Arc::ptr_eq(gate, &self.gate));
        // The map holds one reference and this slot another; more means someone is waiting.
        if registered && Arc::strong_count(&self.gate) <= 2 {
            inflight.remove(self.key);
        }
    }
}

#[derive(Clone)]
/// Shared handle to a [`QueryCache`].
pub struct QueryCacheHandle {
    inner: Arc<QueryCache>,
}

impl QueryCacheHandle {
    /// Creates a new handle with default capacity.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QueryCache::new()),
        }
    }

    /// Creates a new handle with a specific capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueryCache::with_capacity(capacity)),
        }
    }

    /// Looks up a cached reply.
    #[inline]
    pub fn get(&self, model: &str, prompt: &str) -> Option<String> {
        self.inner.get(model, prompt)
    }

    /// Inserts a reply.
    #[inline]
    pub fn insert(&self, key: CacheKey, value: String) -> Option<CacheKey> {
        self.inner.insert(key, value)
    }

    /// See [`QueryCache::get_or_compute`].
    #[inline]
    pub fn get_or_compute<F, E>(&self, model: &str, prompt: &str, compute: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        self.inner.get_or_compute(model, prompt, compute)
    }

    /// See [`QueryCache::get_or_compute_async`].
    pub async fn get_or_compute_async<F, Fut, E>(
        &self,
        model: &str,
        prompt: &str,
        compute: F,
    ) -> Result<(String, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        self.inner
            .get_or_compute_async(model, prompt, compute)
            .await
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Clears all entries.
    #[inline]
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Returns a stats snapshot.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Returns the number of strong references to the underlying cache.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Default for QueryCacheHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCacheHandle")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}
