//! Cache store: timestamped JSON payloads under string keys.
//!
//! Keys follow the dashboard's local-storage naming so an on-disk cache reads
//! the same as the browser one did:
//! - `marketData_{SYMBOL}_{PERIOD}` / `marketData_{SYMBOL}_{PERIOD}_timestamp`
//! - `newsData_{SYMBOL}` / `newsData_{SYMBOL}_timestamp`
//!
//! Stores never report read failures. Anything that cannot be read back as a
//! complete entry is a miss, and the caller refetches.

pub mod file;
pub mod memory;

pub use file::{FileCacheStore, StoredEntryInfo};
pub use memory::MemoryCacheStore;

use crate::domain::{DataKind, Period, Symbol};
use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Deterministic key for one cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn market(symbol: &Symbol, period: Period) -> Self {
        Self(format!("marketData_{}_{}", symbol.ticker(), period.label()))
    }

    pub fn news(symbol: &Symbol) -> Self {
        Self(format!("newsData_{}", symbol.ticker()))
    }

    /// Key for `kind`; news ignores the period.
    pub fn for_kind(kind: DataKind, symbol: &Symbol, period: Period) -> Self {
        match kind {
            DataKind::Market => Self::market(symbol, period),
            DataKind::News => Self::news(symbol),
        }
    }

    /// Companion key holding the write timestamp.
    pub fn timestamp_key(&self) -> String {
        format!("{}_timestamp", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key belongs to `ticker`, for per-symbol clearing.
    pub fn belongs_to(&self, ticker: &str) -> bool {
        let market_prefix = format!("marketData_{ticker}_");
        self.0 == format!("newsData_{ticker}") || self.0.starts_with(&market_prefix)
    }

    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached payload plus the epoch-millis time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: serde_json::Value,
    pub stored_at_millis: i64,
}

impl CacheEntry {
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.stored_at_millis)
    }

    /// Decode the payload; a shape mismatch is reported as `None`.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.payload.clone()).ok()
    }
}

/// Persistent key/value store used by the loader.
///
/// Implementations must be safe to share between threads; concurrent writers
/// resolve as last-write-wins.
pub trait CacheStore: Send + Sync {
    /// Read an entry. Corrupt or partial entries read as `None`.
    fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Write `payload` under `key`, stamped with the store's current time.
    fn set(&self, key: &CacheKey, payload: serde_json::Value) -> Result<(), DataError>;

    /// Remove the entry. Removing a missing entry is not an error.
    fn invalidate(&self, key: &CacheKey);
}

/// True if `entry` is absent, at least `ttl` old at `now_millis`, or stamped
/// in the future (clock skew or a tampered file).
pub fn is_stale(entry: Option<&CacheEntry>, ttl: Duration, now_millis: i64) -> bool {
    match entry {
        None => true,
        Some(e) if e.stored_at_millis > now_millis => true,
        Some(e) => {
            let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            e.age_millis(now_millis) >= ttl_millis
        }
    }
}
