//! Buffered view of an incoming call.

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body::Body;
use http_body_util::BodyExt;

/// An incoming HTTP request with its body already read.
///
/// A body that failed mid-read is kept as the error text, so the failure
/// surfaces at the decode step rather than ahead of authentication.
pub(crate) struct Request {
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, String>,
}

impl Request {
    pub(crate) async fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) => Err(e.to_string()),
        };
        Self { method: parts.method, headers: parts.headers, body }
    }

    pub(crate) fn method(&self) -> &Method { &self.method }
    pub(crate) fn headers(&self) -> &HeaderMap { &self.headers }
    pub(crate) fn body(&self) -> Result<&[u8], &str> {
        self.body.as_deref().map_err(String::as_str)
    }

    /// Header value as text. Missing and non-visible-ASCII values are both `None`.
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
