//! Response cache — read-through caching of `GET` responses with targeted
//! invalidation on writes.
//!
//! ## Pieces
//!
//! - [`CacheStore`] — the key → [`CacheEntry`] backend trait; [`MemoryStore`]
//!   is the in-process implementation.
//! - [`ReadThrough`] — cache-aside middleware for read routes.
//! - [`Invalidate`] — eviction middleware for write routes.
//! - [`ResponseCache`] — a store handle plus TTL that hands out both layers.
//! - [`spawn_sweeper`] — background purge of expired entries.
//!
//! Keys are the canonical request path ([`cache_key`]), so the slash aliases
//! of a route share its entry, and invalidation computes exactly the keys the
//! read side wrote. Numeric captures are only served in their canonical
//! spelling (see [`crate::context::Context::canonical_param`]), so `/players/01`
//! never fills an entry that `/players/1` would have to evict.
//!
//! ## Consistency
//!
//! A write evicts the collection key and any key it can build from its own
//! path parameters before the write handler runs, so the next read of those
//! paths goes to the repository. Keys it cannot build, such as the
//! squad-number lookup on `PUT /players/:id`, may serve the old response until
//! their TTL elapses.

use std::sync::Arc;
use std::time::Duration;

mod layer;
mod store;

pub use layer::{Invalidate, ReadThrough};
pub use store::{CacheEntry, CacheError, CacheStore, MemoryStore, spawn_sweeper};

use crate::http::path::normalize;
use crate::middleware::{MiddlewareHandler, from_middleware};

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// The cache key for a request path.
pub fn cache_key(path: &str) -> String {
    normalize(path).into_owned()
}

/// A shared store handle plus the TTL applied to every entry.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use players_api::cache::{MemoryStore, ResponseCache, DEFAULT_TTL};
///
/// let cache = ResponseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL);
/// let read = cache.read_through();
/// let write = cache.invalidate(&["/players", "/players/:id"]);
/// ```
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// A [`ReadThrough`] layer over this cache.
    pub fn read_through(&self) -> MiddlewareHandler {
        from_middleware(Arc::new(ReadThrough::new(Arc::clone(&self.store), self.ttl)))
    }

    /// An [`Invalidate`] layer evicting the given key templates.
    pub fn invalidate(&self, templates: &[&str]) -> MiddlewareHandler {
        from_middleware(Arc::new(Invalidate::new(Arc::clone(&self.store), templates)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::middleware::{BoxResponseFuture, Next};
    use crate::{Request, Response, Router, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(method: &str, path: &str) -> Request {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        Request::parse(raw.as_bytes()).unwrap().0
    }

    /// A store whose every operation fails.
    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        fn set(&self, _key: &str, _entry: CacheEntry) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        fn purge_expired(&self) -> Result<usize, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    // GET and DELETE on /items/:id; the handler answers with `status` and
    // counts its invocations.
    fn counted_router(cache: &ResponseCache, status: StatusCode) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();

        let counter = Arc::clone(&calls);
        router
            .get("/items/:id", move |_ctx: Context| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Response::new(status).body(format!("call {n}")) }
            })
            .layer(cache.read_through());

        router
            .delete("/items/:id", |_ctx: Context| async { Response::new(StatusCode::NoContent) })
            .layer(cache.invalidate(&["/items", "/items/:id"]));

        (router, calls)
    }

    #[tokio::test]
    async fn hit_skips_handler_and_replays_body() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL);
        let (router, calls) = counted_router(&cache, StatusCode::Ok);

        let first = router.route(request("GET", "/items/1")).await;
        let second = router.route(request("GET", "/items/1/")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.body_ref(), second.body_ref());
    }

    #[tokio::test]
    async fn failures_are_never_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone(), DEFAULT_TTL);
        let (router, calls) = counted_router(&cache, StatusCode::NotFound);

        router.route(request("GET", "/items/1")).await;
        router.route(request("GET", "/items/1")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn write_evicts_then_next_read_misses() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL);
        let (router, calls) = counted_router(&cache, StatusCode::Ok);

        router.route(request("GET", "/items/1")).await;
        router.route(request("DELETE", "/items/1")).await;
        router.route(request("GET", "/items/1")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn broken_store_degrades_to_uncached() {
        let cache = ResponseCache::new(Arc::new(BrokenStore), DEFAULT_TTL);
        let (router, calls) = counted_router(&cache, StatusCode::Ok);

        let res = router.route(request("GET", "/items/1")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        router.route(request("GET", "/items/1")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let res = router.route(request("DELETE", "/items/1")).await;
        assert_eq!(res.status(), StatusCode::NoContent);
    }

    #[tokio::test]
    async fn non_get_passes_through_read_layer() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone(), DEFAULT_TTL);
        let layer = cache.read_through();
        let terminal: MiddlewareHandler =
            Arc::new(|_ctx: Context, _next: Next| -> BoxResponseFuture {
                Box::pin(async { Response::new(StatusCode::Ok) })
            });

        let ctx = Context::new(request("POST", "/items"));
        let res = Next::new(vec![layer, terminal]).run(ctx).await;

        assert_eq!(res.status(), StatusCode::Ok);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn ttl_past_end_of_clock_serves_uncached() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone(), Duration::from_secs(u64::MAX / 2));
        let (router, calls) = counted_router(&cache, StatusCode::Ok);

        let res = router.route(request("GET", "/items/1")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        router.route(request("GET", "/items/1")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());
    }
}
