//! Controller builder
//!
//! A controller groups routes under a base path and carries middleware that
//! runs before every one of its routes.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use tracing::warn;

use crate::handler::{Handler, Middleware, SharedMiddleware};

/// A route as declared on a controller, before registration.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    /// Path relative to the controller base path, always starting with `/`
    pub path: String,
    pub handler: Arc<dyn Handler>,
    /// Route-level middleware, run after the controller's
    pub middleware: Vec<SharedMiddleware>,
    pub description: Option<String>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("middleware", &self.middleware.len())
            .field("description", &self.description)
            .finish()
    }
}

// == Controller ==
/// Routes mounted under one base path.
///
/// ```ignore
/// let controller = Controller::new("/api/cars")
///     .middleware(RequestLogger)
///     .get("", list_cars)
///     .get("/:id", get_car)
///     .describe("Get a car by id")
///     .post("", create_car)
///     .guard(IsAuthorized);
/// ```
pub struct Controller {
    base_path: String,
    middleware: Vec<SharedMiddleware>,
    routes: Vec<Route>,
}

impl Controller {
    /// Creates a controller. The base path is trimmed and given a leading `/`.
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: with_leading_slash(base_path.trim()),
            middleware: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Controller-level middleware, in the order added.
    pub fn controller_middleware(&self) -> &[SharedMiddleware] {
        &self.middleware
    }

    /// Adds middleware that runs before every route of this controller.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    // == Route Declaration ==
    /// Declares a route. An empty path mounts it on the base path itself.
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes.push(Route {
            method,
            path: with_leading_slash(path),
            handler: Arc::new(handler),
            middleware: Vec::new(),
            description: None,
        });
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    // == Route Modifiers ==
    /// Adds middleware to the most recently declared route.
    pub fn guard(mut self, middleware: impl Middleware) -> Self {
        match self.routes.last_mut() {
            Some(route) => route.middleware.push(Arc::new(middleware)),
            None => warn!(
                base_path = %self.base_path,
                middleware = middleware.name(),
                "guard called before any route was declared; ignoring"
            ),
        }
        self
    }

    /// Sets the description of the most recently declared route.
    pub fn describe(mut self, description: &str) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.description = Some(description.to_string());
        }
        self
    }

    pub(crate) fn into_parts(self) -> (String, Vec<SharedMiddleware>, Vec<Route>) {
        (self.base_path, self.middleware, self.routes)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("base_path", &self.base_path)
            .field("middleware", &self.middleware.len())
            .field("routes", &self.routes)
            .finish()
    }
}

fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
