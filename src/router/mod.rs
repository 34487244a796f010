//! Request routing — map URL patterns and HTTP methods to handler functions.
//!
//! [`Router`] dispatches incoming HTTP requests to handlers based on the
//! request method and URL path. Two pattern styles are supported:
//!
//! | Pattern                        | Example match              | Captured params      |
//! |--------------------------------|----------------------------|----------------------|
//! | `/players`                     | `/players`                 | *(none)*             |
//! | `/players/:id`                 | `/players/42`              | `id → "42"`          |
//!
//! Both patterns and incoming paths go through [`normalize`], so `/players/`,
//! `//players` and `/players` reach the same route.
//!
//! Every request runs through a middleware chain: the router's global
//! middleware first, then the matched route's own layers, then the handler.
//! Per-route layers are how the response cache is attached to read routes
//! and how invalidation is attached to write routes.
//!
//! Routes are matched in registration order; the first route whose method and
//! pattern both match wins.

use std::sync::Arc;

use crate::context::{Context, PathParams};
use crate::http::path::normalize;
use crate::middleware::{BoxResponseFuture, MiddlewareHandler, Next};
use crate::{Method, Request, Response, StatusCode};

/// Type-erased async handler that processes a [`Context`] and returns a [`Response`].
///
/// Stored behind an `Arc` so it can be cloned into every request's middleware
/// chain. Use [`Router::get`] and friends rather than building one directly.
pub type Handler = Arc<dyn Fn(Context) -> BoxResponseFuture + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Context) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait through the blanket impl.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given context, boxing the returned future.
    fn call(&self, ctx: Context) -> BoxResponseFuture;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxResponseFuture {
        Box::pin((self)(ctx))
    }
}

// A single path segment, either a literal string or a named capture (`:name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Static(String),
    Parameter(String),
}

/// Compiled representation of a route pattern string.
///
/// Also used by the cache's invalidation layer, which expands a pattern back
/// into a concrete path with [`Pattern::expand`].
#[derive(Debug, Clone)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a route pattern such as `"/players/:id"`.
    ///
    /// The pattern is normalized first, so `"/players/"` and `"/players"`
    /// compile to the same pattern.
    pub fn parse(pattern: &str) -> Self {
        let segments = normalize(pattern)
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Parameter(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Try to match `path`, returning the captured [`PathParams`] on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let path = normalize(path);
        let path_segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if self.segments.len() != path_segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (seg, path_seg) in self.segments.iter().zip(path_segments) {
            match seg {
                Segment::Static(s) if s == path_seg => {}
                Segment::Static(_) => return None,
                Segment::Parameter(name) => params.insert(name.clone(), path_seg.to_string()),
            }
        }
        Some(params)
    }

    /// Build a concrete path by substituting every `:name` segment from
    /// `params`. Returns `None` if any named parameter is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use players_api::context::PathParams;
    /// use players_api::router::Pattern;
    ///
    /// let mut params = PathParams::new();
    /// params.insert("id".into(), "7".into());
    ///
    /// assert_eq!(Pattern::parse("/players/:id").expand(&params).as_deref(), Some("/players/7"));
    /// assert_eq!(Pattern::parse("/players/squadnumber/:squadnumber").expand(&params), None);
    /// ```
    pub fn expand(&self, params: &PathParams) -> Option<String> {
        if self.segments.is_empty() {
            return Some("/".to_string());
        }
        let mut path = String::new();
        for seg in &self.segments {
            path.push('/');
            match seg {
                Segment::Static(s) => path.push_str(s),
                Segment::Parameter(name) => path.push_str(params.get(name)?),
            }
        }
        Some(path)
    }
}

/// A registered route: method + pattern + handler, plus any per-route layers.
pub struct Route {
    method: Method,
    pattern: Pattern,
    layers: Vec<MiddlewareHandler>,
    handler: Handler,
}

impl Route {
    fn new(method: Method, pattern: &str, handler: Handler) -> Self {
        Self {
            method,
            pattern: Pattern::parse(pattern),
            layers: Vec::new(),
            handler,
        }
    }

    /// Wrap this route's handler in `layer`. Layers run in the order they are added.
    pub fn layer(&mut self, layer: MiddlewareHandler) -> &mut Self {
        self.layers.push(layer);
        self
    }

    // Returns `Some(params)` when both the HTTP method and path pattern match.
    fn matches(&self, method: &Method, path: &str) -> Option<PathParams> {
        if &self.method == method {
            self.pattern.matches(path)
        } else {
            None
        }
    }
}

/// HTTP request router that dispatches requests to registered handler functions.
///
/// When no route matches, a bare `404 Not Found` response is returned.
///
/// # Examples
///
/// ```rust,no_run
/// use players_api::{Router, Response, StatusCode, context::Context};
///
/// let mut router = Router::new();
/// router.get("/health", |_ctx| async { Response::new(StatusCode::Ok) });
/// router.get("/players/:id", |ctx: Context| async move {
///     let id = ctx.params().get("id").unwrap_or("unknown").to_owned();
///     Response::new(StatusCode::Ok).body(id)
/// });
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    middlewares: Vec<MiddlewareHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add middleware that runs for every matched route, ahead of route layers.
    pub fn middleware(&mut self, middleware: MiddlewareHandler) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Register a handler for `GET` requests matching `path`.
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Get, path, handler)
    }

    /// Register a handler for `POST` requests matching `path`.
    pub fn post(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Post, path, handler)
    }

    /// Register a handler for `PUT` requests matching `path`.
    pub fn put(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Put, path, handler)
    }

    /// Register a handler for `DELETE` requests matching `path`.
    pub fn delete(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Delete, path, handler)
    }

    // Erase the concrete handler type and store it as a `Handler` trait object.
    fn add_route(&mut self, method: Method, path: &str, handler: impl IntoHandler) -> &mut Route {
        let handler: Handler = Arc::new(move |ctx: Context| handler.call(ctx));
        self.routes.push(Route::new(method, path, handler));
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch `request` to the first matching route and return its response.
    pub async fn route(&self, request: Request) -> Response {
        let matched = self.routes.iter().find_map(|route| {
            route
                .matches(request.method(), request.path())
                .map(|params| (route, params))
        });

        let Some((route, params)) = matched else {
            return Response::new(StatusCode::NotFound);
        };

        let handler = Arc::clone(&route.handler);
        let terminal: MiddlewareHandler =
            Arc::new(move |ctx: Context, _next: Next| -> BoxResponseFuture { handler(ctx) });

        let mut chain = Vec::with_capacity(self.middlewares.len() + route.layers.len() + 1);
        chain.extend(self.middlewares.iter().cloned());
        chain.extend(route.layers.iter().cloned());
        chain.push(terminal);

        Next::new(chain)
            .run(Context::with_params(request, params))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_request(method: &str, path: &str) -> Request {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    fn counting_layer(counter: Arc<AtomicUsize>) -> MiddlewareHandler {
        Arc::new(move |ctx: Context, next: Next| -> BoxResponseFuture {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                next.run(ctx).await
            })
        })
    }

    // ── Pattern ───────────────────────────────────────────────────────────────

    #[test]
    fn pattern_parse_parameterized() {
        let pat = Pattern::parse("/players/:id");
        assert_eq!(
            pat.segments,
            vec![Segment::Static("players".into()), Segment::Parameter("id".into())]
        );
    }

    #[test]
    fn pattern_parse_trailing_slash_stripped() {
        assert_eq!(Pattern::parse("/players/").segments, Pattern::parse("/players").segments);
    }

    #[test]
    fn pattern_exact_match_trailing_slash_normalized() {
        let pat = Pattern::parse("/players");
        assert!(pat.matches("/players").is_some());
        assert!(pat.matches("/players/").is_some());
        assert!(pat.matches("/teams").is_none());
    }

    #[test]
    fn pattern_match_collapses_repeated_slashes() {
        let params = Pattern::parse("/players/:id").matches("/players//1").unwrap();
        assert_eq!(params.get("id"), Some("1"));
    }

    #[test]
    fn pattern_root() {
        let pat = Pattern::parse("/");
        assert!(pat.matches("/").is_some());
        assert!(pat.matches("/other").is_none());
        assert_eq!(pat.expand(&PathParams::new()).as_deref(), Some("/"));
    }

    #[test]
    fn pattern_param_extracts_value() {
        let params = Pattern::parse("/players/:id").matches("/players/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn pattern_param_wrong_segment_count() {
        let pat = Pattern::parse("/players/:id");
        assert!(pat.matches("/players").is_none());
        assert!(pat.matches("/players/squadnumber/10").is_none());
    }

    #[test]
    fn pattern_expand_round_trips_matched_path() {
        let pat = Pattern::parse("/players/squadnumber/:squadnumber");
        let params = pat.matches("/players/squadnumber/10/").unwrap();
        assert_eq!(pat.expand(&params).as_deref(), Some("/players/squadnumber/10"));
    }

    // ── Router ────────────────────────────────────────────────────────────────

    #[test]
    fn router_len_increments_on_add() {
        let mut router = Router::new();
        assert!(router.is_empty());
        router.get("/a", |_ctx| async { Response::new(StatusCode::Ok) });
        router.post("/b", |_ctx| async { Response::new(StatusCode::Ok) });
        assert_eq!(router.len(), 2);
    }

    #[tokio::test]
    async fn router_empty_returns_404() {
        let router = Router::new();
        let res = router.route(make_request("GET", "/")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn router_method_must_match() {
        let mut router = Router::new();
        router.get("/players", |_ctx| async { Response::new(StatusCode::Ok) });
        let res = router.route(make_request("POST", "/players")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn router_alias_paths_hit_same_route() {
        let mut router = Router::new();
        router.get("/players", |_ctx| async { Response::new(StatusCode::Ok) });
        for path in ["/players", "/players/"] {
            let res = router.route(make_request("GET", path)).await;
            assert_eq!(res.status(), StatusCode::Ok, "{path}");
        }
    }

    #[tokio::test]
    async fn router_first_matching_route_wins() {
        let mut router = Router::new();
        router.get("/path", |_ctx| async { Response::new(StatusCode::Ok) });
        router.get("/path", |_ctx| async { Response::new(StatusCode::Created) });
        let res = router.route(make_request("GET", "/path")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn router_handler_receives_params() {
        let mut router = Router::new();
        router.delete("/players/:id", |ctx: Context| async move {
            let id = ctx.params().get("id").unwrap_or("").to_owned();
            Response::new(StatusCode::Ok).body(id)
        });
        let res = router.route(make_request("DELETE", "/players/42")).await;
        assert_eq!(res.body_ref().as_ref(), b"42");
    }

    #[tokio::test]
    async fn route_layers_only_wrap_their_route() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();
        router
            .get("/players", |_ctx| async { Response::new(StatusCode::Ok) })
            .layer(counting_layer(Arc::clone(&hits)));
        router.get("/health", |_ctx| async { Response::new(StatusCode::Ok) });

        router.route(make_request("GET", "/players")).await;
        router.route(make_request("GET", "/health")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn global_middleware_wraps_every_matched_route() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();
        router.middleware(counting_layer(Arc::clone(&hits)));
        router.get("/a", |_ctx| async { Response::new(StatusCode::Ok) });
        router.put("/b", |_ctx| async { Response::new(StatusCode::NoContent) });

        router.route(make_request("GET", "/a")).await;
        router.route(make_request("PUT", "/b")).await;
        router.route(make_request("GET", "/missing")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
