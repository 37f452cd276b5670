//! The call dispatcher.
//!
//! One [`Callable`] serves one endpoint with one handler:
//!
//! | Method  | Answer |
//! |---|---|
//! | `OPTIONS` | CORS preflight, always `204` |
//! | `POST`    | authenticate → negotiate → CORS → decode → handle → encode |
//! | other     | `405`, empty body |
//!
//! Every `POST` ends in exactly one envelope: `{"data": …}` with `200`, or
//! `{"error": {"status", "message"}}` with the status's HTTP code.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use http_body::Body;
use http_body_util::Full;
use tokio::time::Instant;
use tracing::{Dispatch, debug, error};

use crate::auth::{AuthConfig, IdentityVerifier};
use crate::content;
use crate::cors;
use crate::envelope;
use crate::error::{CallError, HandlerError, classify};
use crate::handler::{BoxedHandler, Handler, Outcome};
use crate::request::Request;
use crate::response::{ContentType, IntoResponse, Response, ResponseBuilder};

/// Header carrying the client installation's instance token.
pub const INSTANCE_ID_HEADER: &str = "firebase-instance-id-token";

/// Per-call information handed to the handler next to its input.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CallContext {
    /// Subject id from a verified identity token. `None` when identity
    /// verification is off or the caller sent no token.
    pub uid: Option<String>,
    /// The `Firebase-Instance-ID-Token` header (the push-messaging
    /// registration token), unrelated to identity.
    pub instance_id: Option<String>,
}

// ── Configuration ────────────────────────────────────────────────────────────

/// Construction-time options for a [`Callable`].
///
/// | Field | Default |
/// |---|---|
/// | `auth` | off: no `Authorization` check, `uid` always `None` |
/// | `logger` | the ambient `tracing` dispatcher, a no-op when none is installed |
/// | `timeout` | none |
///
/// ```rust
/// use std::time::Duration;
/// use callable::CallableConfig;
///
/// let config = CallableConfig::new().timeout(Duration::from_secs(10));
/// assert!(config.auth.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallableConfig {
    pub auth: Option<AuthConfig>,
    /// Where opaque handler failures are logged.
    pub logger: Option<Dispatch>,
    /// Deadline covering identity verification plus the handler. Expiry is
    /// answered with `DEADLINE_EXCEEDED`.
    pub timeout: Option<Duration>,
}

impl CallableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns on identity-token verification.
    pub fn auth(mut self, verifier: impl IdentityVerifier, required: bool) -> Self {
        self.auth = Some(AuthConfig::new(verifier, required));
        self
    }

    pub fn logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Callable ─────────────────────────────────────────────────────────────────

/// A handler bound to the callable protocol.
///
/// Built once, then shared by every request: cloning is two `Arc` bumps and
/// no call mutates it.
///
/// ```rust
/// use callable::{call_error, CallContext, Callable, HandlerError};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Who { who: String }
///
/// #[derive(Serialize)]
/// struct Greeting { greeting: String }
///
/// async fn greet(input: Who, _call: CallContext) -> Result<Greeting, HandlerError> {
///     if input.who.is_empty() {
///         return Err(call_error!(NotFound, "nobody to greet").into());
///     }
///     Ok(Greeting { greeting: format!("Hello {}!", input.who) })
/// }
///
/// let callable = Callable::new(greet);
/// ```
#[derive(Clone)]
pub struct Callable {
    handler: BoxedHandler,
    config: Arc<CallableConfig>,
}

impl Callable {
    pub fn new<I, O>(handler: impl Handler<I, O>) -> Self {
        Self::with_config(handler, CallableConfig::default())
    }

    pub fn with_config<I, O>(handler: impl Handler<I, O>, config: CallableConfig) -> Self {
        Self { handler: handler.into_boxed_handler(), config: Arc::new(config) }
    }

    pub fn config(&self) -> &CallableConfig {
        &self.config
    }

    /// Answers one HTTP request. Never fails: every problem becomes a response.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let req = Request::from_http(req).await;
        let method = req.method().clone();
        let response = self.dispatch(req).await;
        debug!(%method, status = response.status_code().as_u16(), "call answered");
        response.into_inner()
    }

    pub(crate) async fn dispatch(&self, req: Request) -> Response {
        match *req.method() {
            Method::OPTIONS => preflight(&req),
            Method::POST => self.post(&req).await,
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }

    async fn post(&self, req: &Request) -> Response {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);

        // Identity runs ahead of CORS: its failures go out through the
        // direct writer, without CORS headers.
        let uid = match &self.config.auth {
            None => None,
            Some(auth) => match within(deadline, auth.authenticate(req.headers().get(AUTHORIZATION))).await {
                Ok(Ok(uid)) => uid,
                Ok(Err(e)) => return e.into_response(),
                Err(e) => {
                    let err = classify(e);
                    self.log(|| error!(status = err.status(), "identity verification failed: {err}"));
                    return err.into_response();
                }
            },
        };

        let negotiated = content::validate_header(req.headers().get(CONTENT_TYPE));

        let mut res = Response::builder();
        cors::actual_response_headers(req.headers(), res.headers_mut());

        if let Err(e) = negotiated {
            return error_response(res, &e);
        }

        let body = match req.body() {
            Ok(body) => body,
            Err(e) => return error_response(res, &envelope::decode_failure(&e)),
        };

        let call = CallContext {
            uid,
            instance_id: req.header(INSTANCE_ID_HEADER).map(str::to_owned),
        };

        let invocation = match self.handler.call(body, call) {
            Ok(invocation) => invocation,
            Err(e) => return error_response(res, &e),
        };

        let outcome = within(deadline, invocation).await.unwrap_or_else(Outcome::Failed);

        match outcome {
            Outcome::Success(bytes) => res.bytes(ContentType::JsonUtf8, bytes),
            Outcome::EncodeFailed(e) => {
                // Status and headers are already decided; only the body is lost.
                self.log(|| error!(error = %e, "failed to write response"));
                res.bytes(ContentType::JsonUtf8, Vec::new())
            }
            Outcome::Failed(e) => {
                let opaque = !matches!(e, HandlerError::Call(_));
                let err = classify(e);
                if opaque {
                    self.log(|| error!(status = err.status(), "callable returned error: {err}"));
                }
                error_response(res, &err)
            }
        }
    }

    /// Runs `emit` under the configured logger, or the ambient one.
    fn log(&self, emit: impl FnOnce()) {
        match &self.config.logger {
            Some(logger) => tracing::dispatcher::with_default(logger, emit),
            None => emit(),
        }
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callable").field("config", &self.config).finish_non_exhaustive()
    }
}

fn preflight(req: &Request) -> Response {
    let mut res = Response::builder().status(StatusCode::NO_CONTENT);
    cors::preflight(req.headers(), res.headers_mut());
    res.no_body()
}

/// Error envelope on the dispatch path: keeps the CORS headers already set
/// and labels the body `application/json; charset=utf-8`.
fn error_response(res: ResponseBuilder, err: &CallError) -> Response {
    res.status(err.kind().status_code())
        .bytes(ContentType::JsonUtf8, envelope::encode_error(err))
}

async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Result<F::Output, HandlerError> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.map_err(|_| HandlerError::DeadlineExceeded),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn callable_is_shareable() {
        assert_send_sync::<Callable>();
    }

    #[test]
    fn config_defaults() {
        let config = CallableConfig::default();
        assert!(config.auth.is_none());
        assert!(config.logger.is_none());
        assert!(config.timeout.is_none());
    }
}
