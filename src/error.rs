//! Error types.
//!
//! [`CallError`] is what a client receives: one [`StatusKind`] plus a
//! message. [`HandlerError`] is what a handler may return; [`classify`] turns
//! any of its variants into a `CallError`. [`Error`] covers the serving
//! harness only (binding, accepting).

use std::fmt;

use crate::envelope;
use crate::response::{ContentType, IntoResponse, Response};
use crate::status::StatusKind;

/// Builds a [`CallError`] from a kind and a format string.
///
/// ```rust
/// use callable::{call_error, StatusKind};
///
/// let who = "alice";
/// let err = call_error!(NotFound, "no user named {who}");
/// assert_eq!(err.kind(), StatusKind::NotFound);
/// assert_eq!(err.to_string(), "NOT_FOUND no user named alice");
/// ```
#[macro_export]
macro_rules! call_error {
    ($kind:ident, $($arg:tt)+) => {
        $crate::CallError::new($crate::StatusKind::$kind, ::std::format!($($arg)+))
    };
}

/// A failure expressed in the callable status taxonomy.
///
/// Immutable once built. `Display` renders `"<STATUS>"` or
/// `"<STATUS> <message>"`, for logs only; clients get status and message as
/// separate envelope fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallError {
    kind: StatusKind,
    message: String,
}

impl CallError {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn kind(&self) -> StatusKind { self.kind }
    pub fn message(&self) -> &str { &self.message }

    /// Canonical status string, e.g. `"INVALID_ARGUMENT"`.
    pub fn status(&self) -> &'static str { self.kind.as_str() }

    /// Diagnostic rendering, identical to `to_string()`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for CallError {}

/// Direct error write: mapped status, `Content-Type: application/json`
/// (no charset parameter), error envelope body.
impl IntoResponse for CallError {
    fn into_response(self) -> Response {
        Response::builder()
            .status(self.kind.status_code())
            .bytes(ContentType::Json, envelope::encode_error(&self))
    }
}

// ── Handler boundary ─────────────────────────────────────────────────────────

/// What a handler returns on failure.
///
/// `?` works on both [`CallError`] and anything `anyhow` accepts:
///
/// ```rust
/// use callable::{call_error, HandlerError};
///
/// fn lookup(id: &str) -> Result<u32, HandlerError> {
///     if id.is_empty() {
///         return Err(call_error!(InvalidArgument, "empty id").into());
///     }
///     let n: u32 = id.parse().map_err(anyhow::Error::from)?;
///     Ok(n)
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Already typed; sent to the client unchanged.
    #[error(transparent)]
    Call(#[from] CallError),

    /// The caller went away before the work finished.
    #[error("context canceled")]
    Cancelled,

    /// The work ran past its deadline.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Anything else. Reported as `INTERNAL` with this error's message.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Converts any handler failure into a [`CallError`].
///
/// Total. A `CallError` or a `tokio` timeout buried in an `Other` chain is
/// honoured; everything else opaque becomes `INTERNAL` carrying its
/// message verbatim.
pub fn classify(err: HandlerError) -> CallError {
    match err {
        HandlerError::Call(e) => e,
        HandlerError::Cancelled => CallError::new(StatusKind::Cancelled, HandlerError::Cancelled.to_string()),
        HandlerError::DeadlineExceeded => {
            CallError::new(StatusKind::DeadlineExceeded, HandlerError::DeadlineExceeded.to_string())
        }
        HandlerError::Other(e) => {
            if let Some(typed) = e.chain().find_map(|c| c.downcast_ref::<CallError>()) {
                return typed.clone();
            }
            if e.chain().any(|c| c.is::<tokio::time::error::Elapsed>()) {
                return CallError::new(StatusKind::DeadlineExceeded, e.to_string());
            }
            CallError::new(StatusKind::Internal, e.to_string())
        }
    }
}

// ── Serving harness ──────────────────────────────────────────────────────────

/// Infrastructure failures from [`Server`](crate::Server): binding to a port
/// or accepting a connection. Call failures are never `Error`s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
