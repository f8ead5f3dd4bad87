//! Mini Dispatch - A minimal HTTP dispatch framework
//!
//! Controllers register routes in a per-method trie. Each request runs
//! through route-scoped middleware and a handler, and successful GET
//! responses are cached with a TTL.

pub mod api;
pub mod cache;
pub mod config;
pub mod controllers;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod models;
pub mod router;

pub use config::{Config, Environment};
pub use dispatcher::{DispatchRequest, DispatchResponse, Dispatcher};
pub use error::{HandlerError, Outcome, RouterError};
pub use handler::{handler_fn, handler_with_state, middleware_fn, Handler, Middleware};
pub use models::{ActionResult, RequestContext};
pub use router::{Controller, RouterRegistry};
