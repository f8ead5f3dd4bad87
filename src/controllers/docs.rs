//! Route documentation controller
//!
//! Mounted at `/docs` in development mode. Lists the routes registered before
//! it, either all at once or grouped by resource.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;

use crate::error::Outcome;
use crate::handler::handler_with_state;
use crate::models::{ActionResult, RequestContext};
use crate::router::{Controller, RouteDescription};

/// Middleware list shown for routes that have none.
const NO_MIDDLEWARE: &str = "None";

/// Snapshot of the route table, indexed by resource.
#[derive(Debug, Default)]
pub struct RouteDocs {
    routes: Vec<RouteDescription>,
    by_resource: BTreeMap<String, Vec<RouteDescription>>,
}

impl RouteDocs {
    pub fn new(mut routes: Vec<RouteDescription>) -> Self {
        for route in routes.iter_mut().filter(|route| route.middleware.is_empty()) {
            route.middleware.push(NO_MIDDLEWARE.to_string());
        }

        let mut by_resource: BTreeMap<String, Vec<RouteDescription>> = BTreeMap::new();
        for route in &routes {
            by_resource
                .entry(resource_of(&route.url))
                .or_default()
                .push(route.clone());
        }
        Self {
            routes,
            by_resource,
        }
    }

    pub fn routes(&self) -> &[RouteDescription] {
        &self.routes
    }

    /// Routes of one resource, empty if unknown.
    pub fn resource(&self, resource: &str) -> &[RouteDescription] {
        self.by_resource
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// First url segment after optional leading `docs` and `api` segments.
fn resource_of(url: &str) -> String {
    let mut segments = url.split('/').filter(|s| !s.is_empty()).peekable();
    if segments.peek() == Some(&"docs") {
        segments.next();
    }
    if segments.peek() == Some(&"api") {
        segments.next();
    }
    segments.next().unwrap_or_default().to_string()
}

pub fn controller(docs: RouteDocs) -> Controller {
    let docs = Arc::new(docs);
    Controller::new("/docs")
        .get("", handler_with_state(Arc::clone(&docs), list_routes))
        .describe("Get a list of all available routes")
        .get("/:resource", handler_with_state(docs, list_resource_routes))
        .describe("Get a list of all available routes for a specific resource")
}

async fn list_routes(docs: Arc<RouteDocs>, _ctx: RequestContext) -> Outcome {
    let body = serde_json::to_value(docs.routes()).context("serializing route docs")?;
    Ok(Some(ActionResult::ok(body)))
}

async fn list_resource_routes(docs: Arc<RouteDocs>, ctx: RequestContext) -> Outcome {
    let resource = ctx.param("resource").unwrap_or_default();
    let body = serde_json::to_value(docs.resource(resource)).context("serializing route docs")?;
    Ok(Some(ActionResult::ok(body)))
}
