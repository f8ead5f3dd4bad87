//! API Handlers
//!
//! The catch-all handler that feeds every request to the [`Dispatcher`], plus
//! the CORS header policy applied to its responses.

use std::collections::BTreeMap;

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{
        header::{self, HeaderName, HeaderValue},
        HeaderMap, Method, Uri,
    },
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::dispatcher::{DispatchRequest, DispatchResponse, Dispatcher, CACHE_HEADER};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE_SECONDS: &str = "86400";

/// Handler for every method and path.
///
/// `OPTIONS` is answered directly; anything else goes through the dispatcher.
/// Unparseable query strings are treated as empty.
pub async fn dispatch_handler(
    State(dispatcher): State<Dispatcher>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight_response();
    }

    let query = Query::<BTreeMap<String, String>>::try_from_uri(&uri)
        .map(|Query(query)| query)
        .unwrap_or_default();

    let request = DispatchRequest {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    };
    dispatcher.dispatch(request).await.into_response()
}

/// Empty 200 carrying the preflight CORS headers.
pub fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    apply_preflight_headers(response.headers_mut());
    response
}

fn apply_preflight_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

fn apply_response_headers(headers: &mut HeaderMap) {
    apply_preflight_headers(headers);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECONDS),
    );
}

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        apply_response_headers(headers);

        // Envelope headers, e.g. `Location` on redirects
        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }

        if self.cache_hit {
            headers.insert(
                HeaderName::from_static(CACHE_HEADER),
                HeaderValue::from_static("HIT"),
            );
        }
        response
    }
}
