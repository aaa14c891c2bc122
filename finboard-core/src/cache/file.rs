//! On-disk cache store laid out like browser local storage.
//!
//! Layout: `{cache_dir}/{key}.json` holds the payload and
//! `{cache_dir}/{key}_timestamp` holds the write time in epoch millis.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Fail-closed reads: a missing half, bad timestamp or bad JSON is a miss
//! - Inspection and clearing for the CLI `cache` commands

use super::{CacheEntry, CacheKey, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::error::DataError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PAYLOAD_EXT: &str = "json";

/// Summary of one stored entry, for `cache status`.
#[derive(Debug, Clone)]
pub struct StoredEntryInfo {
    pub key: CacheKey,
    pub stored_at_millis: Option<i64>,
    pub size_bytes: u64,
}

pub struct FileCacheStore {
    cache_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCacheStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(cache_dir, Arc::new(SystemClock))
    }

    pub fn with_clock(cache_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            clock,
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn payload_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.{PAYLOAD_EXT}", key.as_str()))
    }

    fn timestamp_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.timestamp_key())
    }

    fn read_timestamp(&self, key: &CacheKey) -> Option<i64> {
        fs::read_to_string(self.timestamp_path(key))
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Every entry that has a payload file, sorted by key.
    pub fn entries(&self) -> Vec<StoredEntryInfo> {
        let Ok(dir) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };

        let mut infos: Vec<StoredEntryInfo> = dir
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(PAYLOAD_EXT) {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?.to_string();
                let key = CacheKey::from_raw(stem);
                let payload_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                let ts_size = fs::metadata(self.timestamp_path(&key))
                    .map(|m| m.len())
                    .unwrap_or(0);
                Some(StoredEntryInfo {
                    stored_at_millis: self.read_timestamp(&key),
                    size_bytes: payload_size + ts_size,
                    key,
                })
            })
            .collect();

        infos.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        infos
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        self.remove_where(|_| true)
    }

    /// Remove all entries for one ticker. Returns how many were removed.
    pub fn clear_symbol(&self, ticker: &str) -> usize {
        self.remove_where(|key| key.belongs_to(ticker))
    }

    fn remove_where(&self, pred: impl Fn(&CacheKey) -> bool) -> usize {
        let mut removed = 0;
        for info in self.entries() {
            if pred(&info.key) {
                self.invalidate(&info.key);
                removed += 1;
            }
        }
        removed
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let stored_at_millis = self.read_timestamp(key)?;
        let raw = fs::read_to_string(self.payload_path(key)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(payload) => Some(CacheEntry {
                key: key.as_str().to_string(),
                payload,
                stored_at_millis,
            }),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring corrupt cache payload");
                None
            }
        }
    }

    fn set(&self, key: &CacheKey, payload: serde_json::Value) -> Result<(), DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let body = serde_json::to_string(&payload)
            .map_err(|e| DataError::CacheError(format!("payload serialization: {e}")))?;
        write_atomic(&self.payload_path(key), body.as_bytes())?;

        let now = self.clock.now_millis();
        write_atomic(&self.timestamp_path(key), now.to_string().as_bytes())?;
        Ok(())
    }

    fn invalidate(&self, key: &CacheKey) {
        // Timestamp first: a payload without a timestamp already reads as a miss.
        let _ = fs::remove_file(self.timestamp_path(key));
        let _ = fs::remove_file(self.payload_path(key));
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DataError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents)
        .map_err(|e| DataError::CacheError(format!("write {}: {e}", tmp_path.display())))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::CacheError(format!("atomic rename failed: {e}"))
    })
}
