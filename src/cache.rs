use crate::models::{AnalyzeMode, ArtStyle, EnhanceResult, TargetTool};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: EnhanceResult,
    pub expires_at: DateTime<Utc>,
}

/// Size- and time-bounded map of normalized results.
///
/// Expired entries are dropped lazily: on lookup, or while making room on
/// insert. When the map is full of live entries the oldest insertion is
/// evicted. This is not an LRU.
pub struct ResponseCache {
    entries: Mutex<IndexMap<String, CacheEntry>>,
    capacity: usize,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity: capacity.max(1),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365)),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<EnhanceResult> {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.shift_remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: EnhanceResult) {
        let key = key.into();
        let now = self.clock.now();
        let mut entries = self.lock();

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let expired: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.expires_at <= now)
                .map(|(k, _)| k.clone())
                .collect();
            for stale in expired {
                if entries.len() < self.capacity {
                    break;
                }
                entries.shift_remove(&stale);
            }
            if entries.len() >= self.capacity {
                if let Some((evicted, _)) = entries.shift_remove_index(0) {
                    log::debug!("Response cache full, evicted {}", evicted);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deterministic cache key for an image-flow request.
pub fn fingerprint(
    mode: AnalyzeMode,
    target: TargetTool,
    style: ArtStyle,
    idea: &str,
    mime_type: &str,
    image: &[u8],
) -> String {
    let digest = Sha256::digest(image);
    format!(
        "{}|{}|{}|{}|{}|{:x}",
        mode.as_str(),
        target.as_str(),
        style.as_str(),
        idea.trim(),
        mime_type,
        digest
    )
}
