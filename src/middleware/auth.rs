//! Authorization middleware
//!
//! Requires a bearer token and records it as the caller identity.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Outcome;
use crate::handler::Middleware;
use crate::models::{ActionResult, Identity, RequestContext};

const BEARER_PREFIX: &str = "Bearer ";

/// Rejects requests without an `Authorization: Bearer <token>` header with
/// a 401. Accepted requests get their identity slot filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthorized;

#[async_trait]
impl Middleware for IsAuthorized {
    async fn call(&self, ctx: &mut RequestContext) -> Outcome {
        let token = ctx
            .header("authorization")
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::to_string);

        match token {
            Some(token) => {
                ctx.identity = Some(Identity { token });
                Ok(None)
            }
            None => {
                debug!(path = %ctx.path, "rejecting request without bearer token");
                Ok(Some(ActionResult::unauthorized("Invalid token")))
            }
        }
    }

    fn name(&self) -> &str {
        "isAuthorized"
    }
}
