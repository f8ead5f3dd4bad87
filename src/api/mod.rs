//! API Module
//!
//! Axum glue for the dispatcher: one fallback route, CORS preflight and
//! response headers.

pub mod handlers;
pub mod routes;

pub use handlers::{dispatch_handler, preflight_response};
pub use routes::create_router;
