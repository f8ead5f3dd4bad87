//! Request logging middleware

use async_trait::async_trait;
use tracing::info;

use crate::error::Outcome;
use crate::handler::Middleware;
use crate::models::RequestContext;

/// Logs every routed request. Never vetoes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn call(&self, ctx: &mut RequestContext) -> Outcome {
        info!(
            method = %ctx.method,
            path = %ctx.path,
            params = ?ctx.params,
            query = ?ctx.query,
            "request"
        );
        Ok(None)
    }

    fn name(&self) -> &str {
        "requestLogger"
    }
}
