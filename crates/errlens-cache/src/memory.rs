use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::errors::CacheError;
use crate::stats::SimpleStats;
use crate::store::{CacheKey, ExplanationCache};

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at_ms: i64,
}

impl Entry {
    fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// In-process cache. Expired entries are dropped lazily on the next lookup
/// for their key, so the map never needs a background sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    stats: SimpleStats,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SimpleStats {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl ExplanationCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock();
        match entries.get(key.as_str()) {
            Some(entry) if entry.is_fresh(now_ms) => {
                self.stats.record_hit();
                Ok(Some(entry.value.clone()))
            }
            Some(_) => {
                entries.remove(key.as_str());
                self.stats.record_expiration();
                self.stats.record_miss();
                tracing::debug!(target: "errlens::cache", key = key.as_str(), "expired entry dropped");
                Ok(None)
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at_ms = Utc::now().timestamp_millis() + ttl.as_millis() as i64;
        self.entries.lock().insert(
            key.as_str().to_string(),
            Entry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        self.stats.record_store();
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.entries.lock().remove(key.as_str());
        Ok(())
    }
}
