//! In-memory cache store.

use super::{CacheEntry, CacheKey, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::error::DataError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// `HashMap` behind a mutex. Used for tests and for single-shot CLI runs
/// that should not touch disk.
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Insert an entry with an explicit timestamp (test setup, migration).
    pub fn insert_at(&self, key: &CacheKey, payload: serde_json::Value, stored_at_millis: i64) {
        self.lock().insert(
            key.clone(),
            CacheEntry {
                key: key.as_str().to_string(),
                payload,
                stored_at_millis,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &CacheKey, payload: serde_json::Value) -> Result<(), DataError> {
        let now = self.clock.now_millis();
        self.insert_at(key, payload, now);
        Ok(())
    }

    fn invalidate(&self, key: &CacheKey) {
        self.lock().remove(key);
    }
}
