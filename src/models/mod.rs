//! Request and response models shared by the router, middleware and dispatcher.

pub mod context;
pub mod response;

// Re-export commonly used types
pub use context::{Identity, RequestContext};
pub use response::{ActionResult, ErrorDetail, WireEnvelope};
