//! Middleware chain execution
//!
//! Runs a route's middleware in order, then its handler, inside a single
//! catch boundary. Every failure mode converges to one [`ActionResult`].

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error};

use crate::error::{HandlerError, Outcome};
use crate::handler::{Handler, SharedMiddleware};
use crate::models::{ActionResult, RequestContext};

/// Runs `middleware` in order and returns the first error-class envelope.
///
/// Success envelopes produced by middleware are discarded. `Ok(None)` means
/// every middleware let the request through.
pub async fn execute_middleware(
    middleware: &[SharedMiddleware],
    ctx: &mut RequestContext,
) -> Outcome {
    for mw in middleware {
        match mw.call(ctx).await? {
            Some(result) if result.is_error() => {
                debug!(
                    middleware = mw.name(),
                    status = result.status_code().as_u16(),
                    "middleware vetoed request"
                );
                return Ok(Some(result));
            }
            Some(result) => {
                debug!(
                    middleware = mw.name(),
                    status = result.status_code().as_u16(),
                    "ignoring success result from middleware"
                );
            }
            None => {}
        }
    }
    Ok(None)
}

/// Runs the middleware chain and then the handler.
///
/// Errors raised by either are converted to envelopes, and so are panics.
/// Returns `None` only when the handler itself produced nothing.
pub async fn handle_request(
    handler: &dyn Handler,
    middleware: &[SharedMiddleware],
    ctx: &mut RequestContext,
) -> Option<ActionResult> {
    let run = async {
        match execute_middleware(middleware, ctx).await {
            Ok(Some(vetoed)) => Ok(Some(vetoed)),
            Ok(None) => handler.call(ctx).await,
            Err(err) => Err(err),
        }
    };

    match AssertUnwindSafe(run).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Some(into_logged_result(err)),
        Err(panic) => {
            let message = panic_message(&*panic);
            error!(panic = %message, "handler panicked");
            Some(ActionResult::internal_server_error(message.clone()).with_stack(message))
        }
    }
}

fn into_logged_result(err: HandlerError) -> ActionResult {
    if let HandlerError::Internal(inner) = &err {
        error!(error = ?inner, "unexpected handler failure");
    }
    err.into_action_result()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
