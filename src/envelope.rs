//! JSON envelopes of the callable convention.
//!
//! ```text
//! request   {"data": <input>}
//! success   {"data": <result>}
//! failure   {"error": {"status": "NOT_FOUND", "message": "..."}}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::status::StatusKind;

#[derive(Deserialize)]
struct RequestEnvelope<T> {
    data: T,
}

/// A response body: exactly one of `data` or `error`.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEnvelope<R> {
    Data(R),
    Error(ErrorBody),
}

/// The `error` member of a failure envelope.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

impl From<&CallError> for ErrorBody {
    fn from(err: &CallError) -> Self {
        Self { status: err.status().to_owned(), message: err.message().to_owned() }
    }
}

/// Parses a request body and deserializes its `data` member into `T`.
///
/// Malformed JSON, a missing `data` member or a shape mismatch all come back
/// as `INVALID_ARGUMENT` carrying the parser's message.
pub fn decode_request<T: DeserializeOwned>(body: &[u8]) -> Result<T, CallError> {
    serde_json::from_slice::<RequestEnvelope<T>>(body)
        .map(|env| env.data)
        .map_err(|e| decode_failure(&e))
}

pub(crate) fn decode_failure(e: &dyn std::fmt::Display) -> CallError {
    CallError::new(StatusKind::InvalidArgument, format!("failed to decode payload: {e}"))
}

/// Serializes `{"data": result}`.
pub fn encode_success<R: Serialize>(result: &R) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&ResponseEnvelope::Data(result))
}

/// Serializes `{"error": {"status": ..., "message": ...}}`.
pub fn encode_error(err: &CallError) -> Vec<u8> {
    let env: ResponseEnvelope<()> = ResponseEnvelope::Error(err.into());
    // Two strings; serde_json cannot fail on this shape.
    serde_json::to_vec(&env).unwrap_or_default()
}

/// Client side: unwraps a response body into its result or its error.
///
/// A status string outside the taxonomy comes back as `INTERNAL`.
pub fn decode_response<R: DeserializeOwned>(body: &[u8]) -> Result<R, CallError> {
    match serde_json::from_slice::<ResponseEnvelope<R>>(body) {
        Ok(ResponseEnvelope::Data(data)) => Ok(data),
        Ok(ResponseEnvelope::Error(e)) => {
            let kind = e.status.parse().unwrap_or(StatusKind::Internal);
            Err(CallError::new(kind, e.message))
        }
        Err(e) => Err(CallError::new(StatusKind::Internal, format!("failed to decode response: {e}"))),
    }
}
