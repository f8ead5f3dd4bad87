//! Response Envelope
//!
//! Defines [`ActionResult`], the single value passed between middleware,
//! handlers and the dispatcher, and its JSON wire form.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Error half of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Human readable message, always sent to the client
    pub message: String,
    /// Diagnostic trace, only sent in development mode
    pub stack: Option<String>,
}

// == Action Result ==
/// Uniform result of middleware and handlers.
///
/// A status code of 400 or above always carries an [`ErrorDetail`] and no
/// body; anything below carries an optional body and no error. Every
/// constructor enforces this, coercing statuses that do not fit the variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    status_code: StatusCode,
    body: Option<Value>,
    error: Option<ErrorDetail>,
    headers: BTreeMap<String, String>,
}

impl ActionResult {
    // == Constructors ==
    /// Creates a success envelope with the given status and body.
    ///
    /// A status of 400 or above yields an error envelope of that status whose
    /// message is the canonical reason phrase; the body is dropped.
    pub fn success(status_code: StatusCode, body: Option<Value>) -> Self {
        if status_code.as_u16() >= 400 {
            let reason = status_code.canonical_reason().unwrap_or("Error");
            return Self::error(status_code, reason);
        }
        Self {
            status_code,
            body,
            error: None,
            headers: BTreeMap::new(),
        }
    }

    /// Creates an error envelope with the given status and message.
    ///
    /// A status below 400 is not a valid error status and becomes a 500
    /// carrying the same message.
    pub fn error(status_code: StatusCode, message: impl Into<String>) -> Self {
        let status_code = if status_code.as_u16() >= 400 {
            status_code
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status_code,
            body: None,
            error: Some(ErrorDetail {
                message: message.into(),
                stack: None,
            }),
            headers: BTreeMap::new(),
        }
    }

    /// 200 with a body.
    pub fn ok(body: impl Into<Value>) -> Self {
        Self::success(StatusCode::OK, Some(body.into()))
    }

    /// 201 with a body.
    pub fn created(body: impl Into<Value>) -> Self {
        Self::success(StatusCode::CREATED, Some(body.into()))
    }

    /// 204 without a body.
    pub fn no_content() -> Self {
        Self::success(StatusCode::NO_CONTENT, None)
    }

    /// 302 pointing at `url` through the `Location` header.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::success(StatusCode::FOUND, None).with_header("Location", url)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::error(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::error(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Synthetic 500 for requests where no envelope was ever produced.
    pub fn not_handled() -> Self {
        Self::internal_server_error("[Internal Server Error] Request not handled or timed out")
    }

    // == Builders ==
    /// Adds a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches a diagnostic trace to an error envelope. No-op on success.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.stack = Some(stack.into());
        }
        self
    }

    // == Accessors ==
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn error_detail(&self) -> Option<&ErrorDetail> {
        self.error.as_ref()
    }

    /// Error message, if this is an error envelope.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// True for status codes of 400 and above.
    pub fn is_error(&self) -> bool {
        self.status_code.as_u16() >= 400
    }

    // == Wire Form ==
    /// Builds the JSON payload sent to the client.
    ///
    /// The stack is only included when `include_stack` is set.
    pub fn to_wire(&self, include_stack: bool) -> WireEnvelope<'_> {
        let status_code = self.status_code.as_u16();
        match &self.error {
            Some(error) => WireEnvelope::Failure {
                status_code,
                error: &error.message,
                stack: error.stack.as_deref().filter(|_| include_stack),
            },
            None => WireEnvelope::Success {
                status_code,
                body: self.body.as_ref(),
            },
        }
    }
}

/// Serialized shape of an [`ActionResult`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WireEnvelope<'a> {
    #[serde(rename_all = "camelCase")]
    Success {
        status_code: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<&'a Value>,
    },
    #[serde(rename_all = "camelCase")]
    Failure {
        status_code: u16,
        error: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        stack: Option<&'a str>,
    },
}
