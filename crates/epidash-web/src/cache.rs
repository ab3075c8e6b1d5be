//! Time-bounded cache for reference data.
//!
//! Diseases, questions and the summary change rarely, so their JSON is kept
//! for a fixed TTL. The clock is injected so expiry can be tested without
//! sleeping.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { start: Instant::now(), offset: Mutex::new(Duration::ZERO) }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Diseases,
    Questions,
    Summary,
}

struct Entry {
    stored_at: Instant,
    value: Value,
}

pub struct ReferenceCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl ReferenceCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock, entries: RwLock::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: CacheKey) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&key)
            .filter(|e| now.saturating_duration_since(e.stored_at) < self.ttl)
            .map(|e| e.value.clone())
    }

    pub fn put(&self, key: CacheKey, value: Value) {
        let stored_at = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, Entry { stored_at, value });
    }

    /// Return the cached value, or run `fetch` and cache its result.
    /// The flag is true when the value came from the cache. Failed fetches
    /// are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetch: F) -> Result<(Value, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(?key, "reference cache hit");
            return Ok((value, true));
        }
        let value = fetch().await?;
        self.put(key, value.clone());
        Ok((value, false))
    }
}
