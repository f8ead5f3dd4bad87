//! Handler and middleware traits
//!
//! Routes bind a [`Handler`] and an ordered list of [`Middleware`]. Both are
//! async and return an [`Outcome`]; closures can be adapted with
//! [`handler_fn`] and [`middleware_fn`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Outcome;
use crate::models::RequestContext;

// == Handler ==
/// Endpoint logic bound to a route.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handles one request. Returning `Ok(None)` leaves it unhandled.
    async fn call(&self, ctx: &RequestContext) -> Outcome;
}

// == Middleware ==
/// Guard run before a route's handler.
///
/// A middleware may veto the request with an error-class envelope or fill in
/// parts of the context (such as the identity slot). Success envelopes it
/// returns are ignored.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn call(&self, ctx: &mut RequestContext) -> Outcome;

    /// Name shown in route documentation.
    fn name(&self) -> &str {
        "Anonymous Middleware"
    }
}

/// Shared middleware, reused across every route of a controller.
pub type SharedMiddleware = Arc<dyn Middleware>;

// == Closure Adapters ==
/// Handler built from an async closure over a snapshot of the context.
pub struct FnHandler<F>(F);

/// Wraps `f` as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    async fn call(&self, ctx: &RequestContext) -> Outcome {
        (self.0)(ctx.clone()).await
    }
}

/// Handler built from an async fn that also receives shared state.
pub fn handler_with_state<S, F, Fut>(state: Arc<S>, f: F) -> impl Handler
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    handler_fn(move |ctx| f(Arc::clone(&state), ctx))
}

/// Veto-only middleware built from an async closure.
///
/// The closure sees a snapshot of the context, so it cannot modify it.
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

/// Wraps `f` as a named [`Middleware`].
pub fn middleware_fn<F, Fut>(name: impl Into<String>, f: F) -> FnMiddleware<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    FnMiddleware {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    async fn call(&self, ctx: &mut RequestContext) -> Outcome {
        (self.f)(ctx.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
