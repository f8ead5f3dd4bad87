//! Middleware Module
//!
//! Chain execution plus the stock middleware used by the bundled controllers.

pub mod auth;
pub mod chain;
pub mod logger;

pub use auth::IsAuthorized;
pub use chain::{execute_middleware, handle_request};
pub use logger::RequestLogger;
