//! Cache module for fetched responses
//!
//! Raw response bodies from the content service are kept in memory, keyed by
//! the serialized request body. How long an entry stays usable depends on the
//! [`CacheMode`] of the call site reading it.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache behaviour of a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve cached bodies younger than the interval, refetch otherwise
    Revalidate(Duration),
    /// Never read or write the cache
    NoStore,
    /// Fetch once and keep for the lifetime of the process
    BuildSnapshot,
}

impl CacheMode {
    /// Whether responses fetched under this mode may be stored
    pub fn stores(&self) -> bool {
        !matches!(self, CacheMode::NoStore)
    }
}

/// Upper bound on stored responses
pub const MAX_ENTRIES: usize = 1024;

/// A cached response body
#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    mode: CacheMode,
    fetched_at: Instant,
}

impl CacheEntry {
    /// Revalidated entries past their interval are of no use to anyone
    fn is_expired(&self) -> bool {
        match self.mode {
            CacheMode::Revalidate(interval) => self.fetched_at.elapsed() >= interval,
            CacheMode::NoStore => true,
            CacheMode::BuildSnapshot => false,
        }
    }
}

/// In-memory response cache shared by all renders, keyed by request body
#[derive(Debug)]
pub struct RevalidationCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl Default for RevalidationCache {
    fn default() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }
}

impl RevalidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `max_entries` responses
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a body usable under `mode`
    pub async fn get(&self, key: &str, mode: CacheMode) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        match mode {
            CacheMode::NoStore => None,
            CacheMode::BuildSnapshot => Some(entry.body.clone()),
            CacheMode::Revalidate(interval) => {
                if entry.fetched_at.elapsed() < interval {
                    Some(entry.body.clone())
                } else {
                    tracing::debug!("Cache entry is stale");
                    None
                }
            }
        }
    }

    /// Store a body fetched under `mode`.
    ///
    /// Expired entries are dropped first; if the cache is still full the
    /// oldest entry makes room.
    pub async fn put(&self, key: String, mode: CacheMode, body: String) {
        if !mode.stores() {
            return;
        }

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::debug!("Response cache full, evicting oldest entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                body,
                mode,
                fetched_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
