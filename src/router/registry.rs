//! Router Registry
//!
//! Owns the per-method tries and the set of registered base paths. Built once
//! at startup, then shared read-only.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;
use tracing::{debug, info};

use super::{Controller, TrieNode};
use crate::error::RouterError;
use crate::handler::{Handler, SharedMiddleware};

const NO_DESCRIPTION: &str = "No description provided";

/// A route bound into the trie, with its composed middleware.
pub struct RouteEntry {
    pub method: Method,
    /// Full pattern, base path included
    pub url: String,
    pub handler: Arc<dyn Handler>,
    /// Controller middleware followed by route middleware
    pub middleware: Vec<SharedMiddleware>,
    pub description: String,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("middleware", &self.middleware_names())
            .field("description", &self.description)
            .finish()
    }
}

impl RouteEntry {
    pub fn middleware_names(&self) -> Vec<String> {
        self.middleware.iter().map(|m| m.name().to_string()).collect()
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteEntry>,
    pub params: HashMap<String, String>,
}

/// Documentation view of a registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescription {
    pub method: String,
    pub url: String,
    pub description: String,
    pub middleware: Vec<String>,
}

// == Router Registry ==
#[derive(Debug, Default)]
pub struct RouterRegistry {
    roots: HashMap<Method, TrieNode>,
    base_paths: BTreeSet<String>,
}

impl RouterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Inserts every route of `controller`.
    ///
    /// Fails without touching the tries if the base path is already taken.
    pub fn register(&mut self, controller: Controller) -> Result<(), RouterError> {
        let (base_path, controller_middleware, routes) = controller.into_parts();

        if self.base_paths.contains(&base_path) {
            return Err(RouterError::DuplicateBasePath { base_path });
        }

        let route_count = routes.len();
        for route in routes {
            let url = normalize_path(&format!("{}{}", base_path, route.path)).to_string();
            let middleware = controller_middleware
                .iter()
                .chain(route.middleware.iter())
                .cloned()
                .collect();
            let entry = Arc::new(RouteEntry {
                method: route.method.clone(),
                description: route
                    .description
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                url,
                handler: route.handler,
                middleware,
            });

            debug!(method = %entry.method, url = %entry.url, "binding route");
            self.roots
                .entry(route.method)
                .or_default()
                .insert(&split_segments(&entry.url), Arc::clone(&entry));
        }

        info!(base_path = %base_path, routes = route_count, "registered controller");
        self.base_paths.insert(base_path);
        Ok(())
    }

    // == Match ==
    /// Resolves `method` + `path` to a route and its captured parameters.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let root = self.roots.get(method)?;
        let segments = split_segments(normalize_path(path));
        let mut params = HashMap::new();
        root.find(&segments, &mut params).map(|route| RouteMatch {
            route: Arc::clone(route),
            params,
        })
    }

    // == Introspection ==
    /// Every bound route, ordered by url then method.
    pub fn routes(&self) -> Vec<RouteDescription> {
        let mut entries = Vec::new();
        for root in self.roots.values() {
            root.collect(&mut entries);
        }
        let mut routes: Vec<RouteDescription> = entries
            .into_iter()
            .map(|entry| RouteDescription {
                method: entry.method.to_string(),
                url: entry.url.clone(),
                description: entry.description.clone(),
                middleware: entry.middleware_names(),
            })
            .collect();
        routes.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        routes
    }

    pub fn base_paths(&self) -> impl Iterator<Item = &str> {
        self.base_paths.iter().map(String::as_str)
    }

    pub fn has_base_path(&self, base_path: &str) -> bool {
        self.base_paths.contains(base_path)
    }
}

/// Drops a trailing `/` from any path longer than one character.
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
