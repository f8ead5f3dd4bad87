//! Dispatcher
//!
//! Runs one request end to end: route match, cache check for GET, middleware
//! chain and handler, cache store, serialization.
//!
//! Cache keys ignore the request body and the caller identity. Only mount
//! public GET endpoints behind it, or a cached response for one caller will
//! be served to the next. There is also no per-request deadline: a handler
//! that never resolves keeps its connection open.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info_span, warn, Instrument};

use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::middleware::handle_request;
use crate::models::{ActionResult, RequestContext};
use crate::router::{normalize_path, RouterRegistry};

/// Response header set on responses served from the cache.
pub const CACHE_HEADER: &str = "x-cache";

/// Shared response cache.
pub type ResponseCache = Arc<RwLock<CacheStore<ActionResult>>>;

/// Inbound request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: HeaderMap,
    /// Raw body, parsed leniently as JSON
    pub body: Bytes,
}

impl DispatchRequest {
    /// Request with no query, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Serialized outcome of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub headers: BTreeMap<String, String>,
    /// JSON payload
    pub body: String,
    pub cache_hit: bool,
}

impl DispatchResponse {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            headers: BTreeMap::new(),
            body: json!({ "message": "Not Found" }).to_string(),
            cache_hit: false,
        }
    }
}

// == Dispatcher ==
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<RouterRegistry>,
    cache: ResponseCache,
    include_stack: bool,
}

impl Dispatcher {
    pub fn new(router: RouterRegistry, cache: CacheStore<ActionResult>, include_stack: bool) -> Self {
        Self {
            router: Arc::new(router),
            cache: Arc::new(RwLock::new(cache)),
            include_stack,
        }
    }

    /// Creates a dispatcher with a cache and error mode taken from `config`.
    pub fn from_config(router: RouterRegistry, config: &Config) -> Self {
        Self::new(router, CacheStore::new(config.cache_ttl), config.include_stack())
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Snapshot of the response cache counters.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Dispatch ==
    /// Handles one request and returns the response to send.
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchResponse {
        let path = normalize_path(&request.path).to_string();
        let span = info_span!("dispatch", method = %request.method, path = %path);
        self.dispatch_inner(request, path).instrument(span).await
    }

    async fn dispatch_inner(&self, request: DispatchRequest, path: String) -> DispatchResponse {
        let DispatchRequest {
            method,
            query,
            headers,
            body,
            ..
        } = request;

        let Some(matched) = self.router.match_route(&method, &path) else {
            debug!("no route matched");
            return DispatchResponse::not_found();
        };

        let is_get = method == Method::GET;
        let key = cache_key(&method, &path, &query);

        if is_get {
            let cached = self.cache.write().await.get(&key);
            if let Some(cached) = cached {
                debug!(key = %key, "serving from cache");
                return self.serialize(&cached, true);
            }
        }

        let mut ctx = RequestContext {
            method,
            path,
            params: matched.params,
            query,
            body: parse_body(&body),
            headers,
            identity: None,
        };

        let route = &matched.route;
        let result = handle_request(route.handler.as_ref(), &route.middleware, &mut ctx)
            .await
            .unwrap_or_else(|| {
                warn!(url = %route.url, "handler produced no result");
                ActionResult::not_handled()
            });

        if is_get && !result.is_error() && result.body().is_some() {
            debug!(key = %key, "caching response");
            self.cache.write().await.set(key, result.clone(), None);
        }

        self.serialize(&result, false)
    }

    fn serialize(&self, result: &ActionResult, cache_hit: bool) -> DispatchResponse {
        match serde_json::to_string(&result.to_wire(self.include_stack)) {
            Ok(body) => DispatchResponse {
                status: result.status_code(),
                headers: result.headers().clone(),
                body,
                cache_hit,
            },
            Err(err) => {
                error!(error = %err, "failed to serialize response envelope");
                let fallback = ActionResult::internal_server_error("Failed to serialize response");
                DispatchResponse {
                    status: fallback.status_code(),
                    headers: BTreeMap::new(),
                    body: json!({
                        "statusCode": fallback.status_code().as_u16(),
                        "error": fallback.error_message(),
                    })
                    .to_string(),
                    cache_hit: false,
                }
            }
        }
    }
}

/// Builds the cache key for a request: method, normalized path and the query
/// map serialized as JSON.
pub fn cache_key(method: &Method, path: &str, query: &BTreeMap<String, String>) -> String {
    let query = serde_json::to_string(query).unwrap_or_default();
    format!("{}-{}{}", method, normalize_path(path), query)
}

/// Parses a request body as JSON. Empty or malformed bodies become `{}`.
pub fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_fn, middleware_fn};
    use crate::middleware::IsAuthorized;
    use crate::router::Controller;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dispatcher(controller: Controller, include_stack: bool) -> Dispatcher {
        let mut router = RouterRegistry::new();
        router.register(controller).unwrap();
        Dispatcher::new(router, CacheStore::new(60), include_stack)
    }

    fn counted_ok(calls: Arc<AtomicUsize>) -> impl crate::handler::Handler {
        handler_fn(move |ctx: RequestContext| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(Some(ActionResult::ok(json!({ "query": ctx.query })))) }
        })
    }

    #[test]
    fn test_cache_key_format() {
        let mut query = BTreeMap::new();
        query.insert("page".to_string(), "2".to_string());
        query.insert("make".to_string(), "Ford".to_string());

        assert_eq!(
            cache_key(&Method::GET, "/api/cars/", &query),
            r#"GET-/api/cars{"make":"Ford","page":"2"}"#
        );
        assert_eq!(cache_key(&Method::GET, "/api/cars", &BTreeMap::new()), "GET-/api/cars{}");
    }

    #[test]
    fn test_parse_body_is_lenient() {
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"{not json"), json!({}));
        assert_eq!(parse_body(br#"{"make":"Honda"}"#), json!({"make": "Honda"}));
    }

    #[tokio::test]
    async fn test_unmatched_route_is_404() {
        let d = dispatcher(Controller::new("/api"), false);

        let response = d.dispatch(DispatchRequest::new(Method::GET, "/nowhere")).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, r#"{"message":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_second_get_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(Controller::new("/api").get("/items", counted_ok(calls.clone())), false);

        let mut request = DispatchRequest::new(Method::GET, "/api/items");
        request.query.insert("page".to_string(), "1".to_string());

        let first = d.dispatch(request.clone()).await;
        let second = d.dispatch(request).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.body, second.body);
        assert_eq!(first.status, StatusCode::OK);

        let stats = d.cache_stats().await;
        assert_eq!((stats.hits, stats.misses, stats.total_entries), (1, 1, 1));
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_different_query_is_a_different_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(Controller::new("/api").get("/items", counted_ok(calls.clone())), false);

        let mut request = DispatchRequest::new(Method::GET, "/api/items");
        d.dispatch(request.clone()).await;
        request.query.insert("page".to_string(), "2".to_string());
        let response = d.dispatch(request).await;

        assert!(!response.cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_get_and_errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(
            Controller::new("/api")
                .post("/items", counted_ok(calls.clone()))
                .get("/broken", handler_fn(|_ctx| async { Ok(Some(ActionResult::not_found("gone"))) })),
            false,
        );

        d.dispatch(DispatchRequest::new(Method::POST, "/api/items")).await;
        d.dispatch(DispatchRequest::new(Method::POST, "/api/items")).await;
        let broken = d.dispatch(DispatchRequest::new(Method::GET, "/api/broken")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(broken.status, StatusCode::NOT_FOUND);
        assert_eq!(broken.body, r#"{"statusCode":404,"error":"gone"}"#);
        assert!(d.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_clear_forces_handler_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(Controller::new("/api").get("/items", counted_ok(calls.clone())), false);

        d.dispatch(DispatchRequest::new(Method::GET, "/api/items")).await;
        assert_eq!(d.cache().write().await.clear("GET-/api/items"), 1);
        d.dispatch(DispatchRequest::new(Method::GET, "/api/items")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_without_result_is_not_handled() {
        let d = dispatcher(
            Controller::new("/api").get("/silent", handler_fn(|_ctx| async { Ok(None) })),
            false,
        );

        let response = d.dispatch(DispatchRequest::new(Method::GET, "/api/silent")).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            json["error"],
            "[Internal Server Error] Request not handled or timed out"
        );
    }

    #[tokio::test]
    async fn test_stack_only_in_development() {
        let failing = || handler_fn(|_ctx| async { Err(anyhow!("boom").into()) });

        let prod = dispatcher(Controller::new("/api").get("/fail", failing()), false)
            .dispatch(DispatchRequest::new(Method::GET, "/api/fail"))
            .await;
        let dev = dispatcher(Controller::new("/api").get("/fail", failing()), true)
            .dispatch(DispatchRequest::new(Method::GET, "/api/fail"))
            .await;

        let prod: Value = serde_json::from_str(&prod.body).unwrap();
        let dev: Value = serde_json::from_str(&dev.body).unwrap();
        assert_eq!(prod["error"], "boom");
        assert!(prod.get("stack").is_none());
        assert_eq!(dev["statusCode"], 500);
        assert!(dev["stack"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_middleware_veto_skips_handler_and_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(
            Controller::new("/api")
                .get("/private", counted_ok(calls.clone()))
                .guard(IsAuthorized),
            false,
        );

        let response = d.dispatch(DispatchRequest::new(Method::GET, "/api/private")).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, r#"{"statusCode":401,"error":"Invalid token"}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(d.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_lenient_body_reaches_handler() {
        let d = dispatcher(
            Controller::new("/api")
                .post(
                    "/echo",
                    handler_fn(|ctx: RequestContext| async move {
                        Ok(Some(ActionResult::created(ctx.body)))
                    }),
                )
                .middleware(middleware_fn("noop", |_ctx| async { Ok(None) })),
            false,
        );

        let mut request = DispatchRequest::new(Method::POST, "/api/echo");
        request.body = Bytes::from_static(b"{{{");
        let response = d.dispatch(request).await;

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, r#"{"statusCode":201,"body":{}}"#);
    }

    #[tokio::test]
    async fn test_redirect_headers_are_kept() {
        let d = dispatcher(
            Controller::new("/old").get("", handler_fn(|_ctx| async {
                Ok(Some(ActionResult::redirect("/new")))
            })),
            false,
        );

        let response = d.dispatch(DispatchRequest::new(Method::GET, "/old/")).await;

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers.get("Location").unwrap(), "/new");
        assert_eq!(response.body, r#"{"statusCode":302}"#);
    }
}
