//! Cache storage: the entry type, the backend trait, and the in-memory backend.

use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::http::{Headers, Response, StatusCode};

/// Errors a cache backend may report.
///
/// The response cache is an optimization, so callers log these and carry on
/// as if the cache were disabled for that one operation.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// One memoized HTTP response with an absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    /// Captures the status, headers, and body of `response`.
    pub fn capture(response: &Response, expires_at: Instant) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body_ref().clone(),
            expires_at,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// An entry is dead from its expiry instant onwards.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Rebuilds the stored response verbatim.
    pub fn to_response(&self) -> Response {
        Response::from_parts(self.status, self.headers.clone(), self.body.clone())
    }
}

/// A key → [`CacheEntry`] store shared by every request.
///
/// Implementations must serialize operations on the same key so that no
/// caller ever observes a partially written entry. `get` must treat expired
/// entries as absent, and `delete` of an absent key must succeed.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Inserts or overwrites the entry for `key`.
    fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Drops every expired entry, returning how many were removed.
    fn purge_expired(&self) -> Result<usize, CacheError>;
}

/// In-process [`CacheStore`] backed by a sharded [`DashMap`].
///
/// Each shard has its own lock, so operations on one key are serialized while
/// keys in different shards proceed without contention.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until they are purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired_at(now) {
                return Ok(Some(entry.value().clone()));
            }
        }
        // The shard guard is released above; an entry written meanwhile is
        // fresh and survives the predicate.
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            debug!(key, "dropped expired cache entry");
        }
        Ok(None)
    }

    fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

/// Spawns a task that purges expired entries from `store` every `every`.
///
/// The first purge happens one full interval after the call.
pub fn spawn_sweeper<S>(store: std::sync::Arc<S>, every: Duration) -> JoinHandle<()>
where
    S: CacheStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        let Some(start) = Instant::now().checked_add(every) else {
            warn!(?every, "sweep interval overflows the clock, sweeper disabled");
            return;
        };
        let mut ticker = tokio::time::interval_at(start, every);
        loop {
            ticker.tick().await;
            match store.purge_expired() {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "purged expired cache entries"),
                Err(e) => warn!(error = %e, "cache sweep failed"),
            }
        }
    })
}
