//! TTL-aware cache manager over an injected key-value store.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::store::{CacheStore, StoreError};

use super::entry::{self, CacheEntry};
use super::keys::DEFAULT_PREFIX;

/// Namespaced cache API shared by every fetcher in the app.
///
/// All storage-layer failures (missing medium, corrupt entries, capacity)
/// are recovered here and read as cache misses; nothing below this layer
/// surfaces to callers.
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    prefix: String,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_prefix(store, DEFAULT_PREFIX)
    }

    pub fn with_prefix(store: Arc<dyn CacheStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn store_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // =========================================================================
    // Single-entry operations
    // =========================================================================

    /// Write `data` under `key` with the given validity window.
    ///
    /// Failures are not surfaced: a full store triggers one sweep of expired
    /// entries as remediation and the write is dropped either way.
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        let entry = CacheEntry::new(data, ttl);
        let text = match entry::encode(&entry) {
            Ok(text) => text,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        match self.store.set(&self.store_key(key), &text) {
            Ok(()) => {}
            Err(StoreError::Full) => {
                warn!(key, "Cache store full, sweeping expired entries");
                let removed = self.clear_expired();
                debug!(removed, "Capacity sweep finished");
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to write cache entry");
            }
        }
    }

    /// Read the payload stored under `key`, if present and still valid.
    ///
    /// Corrupt and expired entries are deleted on the way out (lazy expiry)
    /// and read as misses.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store_key = self.store_key(key);
        let text = self.store.get(&store_key)?;

        let entry: CacheEntry<T> = match entry::decode(&text) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "Dropping undecodable cache entry");
                self.store.remove(&store_key);
                return None;
            }
        };

        if entry.is_expired() {
            debug!(key, age_ms = entry.age_ms(), "Dropping expired cache entry");
            self.store.remove(&store_key);
            return None;
        }

        Some(entry.data)
    }

    /// Pure validity predicate: `true` only for a present, decodable,
    /// unexpired entry. Never deletes anything.
    pub fn is_valid(&self, key: &str) -> bool {
        match self.store.get(&self.store_key(key)) {
            Some(text) => match entry::decode::<Value>(&text) {
                Ok(entry) => entry.is_valid(),
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Whether a decodable entry exists for `key`, expired or not.
    ///
    /// The fetch layer uses this to decide if stale data may keep being
    /// shown after a failed refresh.
    pub fn has_entry(&self, key: &str) -> bool {
        match self.store.get(&self.store_key(key)) {
            Some(text) => entry::decode::<Value>(&text).is_ok(),
            None => false,
        }
    }

    /// Delete a single entry.
    pub fn remove(&self, key: &str) {
        self.store.remove(&self.store_key(key));
    }

    // =========================================================================
    // Bulk operations
    // =========================================================================

    /// Delete every namespaced entry that is expired or fails to decode.
    /// Returns the number of entries removed.
    pub fn clear_expired(&self) -> usize {
        let mut removed = 0;
        for store_key in self.namespaced_keys() {
            let Some(text) = self.store.get(&store_key) else {
                continue;
            };
            let stale = match entry::decode::<Value>(&text) {
                Ok(entry) => entry.is_expired(),
                Err(_) => true,
            };
            if stale {
                self.store.remove(&store_key);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "Cleared expired cache entries");
        }
        removed
    }

    /// Delete every namespaced entry unconditionally. Used on logout so the
    /// next session never sees another account's data. Keys outside the
    /// namespace are untouched.
    pub fn clear_all(&self) -> usize {
        let keys = self.namespaced_keys();
        let removed = keys.len();
        for store_key in keys {
            self.store.remove(&store_key);
        }
        debug!(removed, "Cleared all cache entries");
        removed
    }

    fn namespaced_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&self.prefix))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
