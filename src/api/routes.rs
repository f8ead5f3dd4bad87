//! API Routes
//!
//! Configures the Axum router. All routing happens in the dispatcher, so the
//! Axum side is a single fallback.

use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::dispatch_handler;
use crate::dispatcher::Dispatcher;

/// Creates the main router.
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}
