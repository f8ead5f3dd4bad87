//! Request Context
//!
//! Everything a middleware or handler gets to see about the inbound request.

use std::collections::{BTreeMap, HashMap};

use axum::http::{HeaderMap, Method};
use serde_json::Value;

use crate::error::HandlerError;

/// Identity attached by an authorization middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Bearer token the caller presented
    pub token: String,
}

// == Request Context ==
/// Per-request state threaded through the middleware chain and the handler.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Normalized request path
    pub path: String,
    /// Values captured by `:name` segments
    pub params: HashMap<String, String>,
    pub query: BTreeMap<String, String>,
    /// Parsed JSON body, `{}` when absent or malformed
    pub body: Value,
    pub headers: HeaderMap,
    /// Filled by authorization middleware, `None` for anonymous callers
    pub identity: Option<Identity>,
}

impl RequestContext {
    /// Creates a context with no params, query, headers or identity and an
    /// empty object body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            query: BTreeMap::new(),
            body: Value::Object(Default::default()),
            headers: HeaderMap::new(),
            identity: None,
        }
    }

    /// Returns a path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns a header value if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the caller identity or a 401 error if no authorization
    /// middleware has vouched for this request.
    pub fn require_identity(&self) -> Result<&Identity, HandlerError> {
        self.identity
            .as_ref()
            .ok_or_else(|| HandlerError::unauthorized("Authentication required"))
    }
}
