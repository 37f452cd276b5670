//! CORS headers for the callable endpoint.
//!
//! The endpoint is open to every origin: the request's `Origin` is echoed
//! back, never matched against a list.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue};

/// Headers for a preflight (`OPTIONS`) answer. The caller sends them with
/// `204 No Content` and an empty body.
pub fn preflight(request: &HeaderMap, response: &mut HeaderMap) {
    response.append(VARY, HeaderValue::from_static("Origin"));
    response.append(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
    response.append(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST"));
    if non_empty(request.get(ACCESS_CONTROL_REQUEST_HEADERS)).is_some() {
        response.append(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    }
    echo_origin(request, response);
}

/// Headers for the answer to an actual `POST`.
pub fn actual_response_headers(request: &HeaderMap, response: &mut HeaderMap) {
    response.append(VARY, HeaderValue::from_static("Origin"));
    echo_origin(request, response);
}

fn echo_origin(request: &HeaderMap, response: &mut HeaderMap) {
    if let Some(origin) = non_empty(request.get(ORIGIN)) {
        response.append(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    }
}

fn non_empty(value: Option<&HeaderValue>) -> Option<&HeaderValue> {
    value.filter(|v| !v.is_empty())
}
