//! Error types for the dispatch framework
//!
//! Provides unified error handling using thiserror.

use axum::http::StatusCode;
use thiserror::Error;

use crate::models::ActionResult;

// == Router Error Enum ==
/// Configuration errors raised while registering controllers.
///
/// These surface at startup, before any request is served.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A controller with the same base path is already registered
    #[error("Controller with basePath {base_path} already exists")]
    DuplicateBasePath { base_path: String },
}

// == Handler Error Enum ==
/// Failure raised by a middleware or handler instead of returning an envelope.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Deliberate failure carrying its own status code
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Unexpected fault, reported to the client as a 500
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Builds a status-carrying error.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        HandlerError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::status(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::status(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(StatusCode::NOT_FOUND, message)
    }

    // == Envelope Conversion ==
    /// Converts the error into the envelope it stands for.
    ///
    /// A status error below 400 is not a valid error envelope and is reported
    /// as a 500 carrying the same message.
    pub fn into_action_result(self) -> ActionResult {
        match self {
            HandlerError::Status { status, message } if status.as_u16() >= 400 => {
                ActionResult::error(status, message)
            }
            HandlerError::Status { message, .. } => ActionResult::internal_server_error(message),
            HandlerError::Internal(err) => {
                ActionResult::internal_server_error(err.to_string()).with_stack(format!("{err:?}"))
            }
        }
    }
}

// == Result Type Alias ==
/// Outcome of a middleware or handler call.
///
/// `Ok(None)` means "nothing produced": continue for middleware, not handled
/// for handlers.
pub type Outcome = std::result::Result<Option<ActionResult>, HandlerError>;
