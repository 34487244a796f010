//! Middleware that puts the response cache in front of handlers.
//!
//! [`ReadThrough`] wraps read routes (cache-aside). [`Invalidate`] wraps write
//! routes and evicts the affected keys before the write handler runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::cache_key;
use super::store::{CacheEntry, CacheStore};
use crate::context::{Context, PathParams};
use crate::middleware::{BoxResponseFuture, Middleware, Next};
use crate::router::Pattern;
use crate::Method;

/// Cache-aside layer for `GET` routes.
///
/// On a hit the stored response is returned and the rest of the chain is
/// skipped. On a miss the chain runs, and a 2xx response is stored under the
/// request's canonical key with `expires_at = now + ttl`. Non-`GET` requests
/// and non-2xx responses pass through untouched, as does everything when
/// `now + ttl` is past the end of the clock.
pub struct ReadThrough {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ReadThrough {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }
}

impl Middleware for ReadThrough {
    fn handle(&self, ctx: Context, next: Next) -> BoxResponseFuture {
        let store = Arc::clone(&self.store);
        let ttl = self.ttl;

        Box::pin(async move {
            if ctx.request().method() != &Method::Get {
                return next.run(ctx).await;
            }

            let key = cache_key(ctx.request().path());
            match store.get(&key) {
                Ok(Some(entry)) => {
                    debug!(key = %key, "cache hit");
                    return entry.to_response();
                }
                Ok(None) => debug!(key = %key, "cache miss"),
                Err(e) => warn!(key = %key, error = %e, "cache lookup failed, bypassing"),
            }

            let response = next.run(ctx).await;

            if response.status().is_success() {
                let Some(expires_at) = Instant::now().checked_add(ttl) else {
                    warn!(key = %key, ?ttl, "ttl overflows the clock, not caching");
                    return response;
                };
                let entry = CacheEntry::capture(&response, expires_at);
                match store.set(&key, entry) {
                    Ok(()) => debug!(key = %key, ?ttl, "cached response"),
                    Err(e) => warn!(key = %key, error = %e, "failed to cache response"),
                }
            }

            response
        })
    }
}

/// Eviction layer for write routes.
///
/// Configured with key templates in route-pattern syntax. Before the wrapped
/// handler runs, every template whose parameters are all present in the
/// request's path parameters is expanded and its key deleted. Templates that
/// cannot be expanded are skipped; those entries age out through their TTL.
///
/// Eviction happens whether or not the write later succeeds.
pub struct Invalidate {
    store: Arc<dyn CacheStore>,
    templates: Vec<Pattern>,
}

impl Invalidate {
    pub fn new(store: Arc<dyn CacheStore>, templates: &[&str]) -> Self {
        Self {
            store,
            templates: templates.iter().map(|t| Pattern::parse(t)).collect(),
        }
    }

    /// The canonical keys evicted for a request carrying `params`.
    pub fn keys_for(&self, params: &PathParams) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(self.templates.len());
        for key in self
            .templates
            .iter()
            .filter_map(|template| template.expand(params))
            .map(|path| cache_key(&path))
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl Middleware for Invalidate {
    fn handle(&self, ctx: Context, next: Next) -> BoxResponseFuture {
        let store = Arc::clone(&self.store);
        let keys = self.keys_for(ctx.params());

        Box::pin(async move {
            for key in &keys {
                match store.delete(key) {
                    Ok(()) => debug!(key = %key, "invalidated cache entry"),
                    Err(e) => warn!(key = %key, error = %e, "cache invalidation failed"),
                }
            }
            next.run(ctx).await
        })
    }
}
