//! The callable status taxonomy.
//!
//! Every failure a client ever sees is one [`StatusKind`]: a canonical status
//! string for the JSON envelope plus the HTTP status code the response goes
//! out with. The table follows the Google API error model
//! (<https://cloud.google.com/apis/design/errors#http_mapping>).
//!
//! ```rust
//! use callable::StatusKind;
//!
//! assert_eq!(StatusKind::NotFound.as_str(), "NOT_FOUND");
//! assert_eq!(StatusKind::NotFound.http_code(), 404);
//!
//! // Unknown wire codes never fail, they collapse to INTERNAL.
//! assert_eq!(StatusKind::from_code(-1), StatusKind::Internal);
//! ```

use std::fmt;
use std::str::FromStr;

use http::StatusCode;

/// A callable error status.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusKind {
    // ── 4xx ──────────────────────────────────────────────────────────────────
    InvalidArgument,    // 400
    FailedPrecondition, // 400
    OutOfRange,         // 400
    Unauthenticated,    // 401
    PermissionDenied,   // 403
    NotFound,           // 404
    Aborted,            // 409
    AlreadyExists,      // 409
    ResourceExhausted,  // 429
    Cancelled,          // 499

    // ── 5xx ──────────────────────────────────────────────────────────────────
    DataLoss,           // 500
    Unknown,            // 500
    Internal,           // 500
    NotImplemented,     // 501
    Unavailable,        // 503
    DeadlineExceeded,   // 504
}

/// Every kind, in wire-code order.
pub(crate) const ALL: [StatusKind; 16] = [
    StatusKind::InvalidArgument,
    StatusKind::FailedPrecondition,
    StatusKind::OutOfRange,
    StatusKind::Unauthenticated,
    StatusKind::PermissionDenied,
    StatusKind::NotFound,
    StatusKind::Aborted,
    StatusKind::AlreadyExists,
    StatusKind::ResourceExhausted,
    StatusKind::Cancelled,
    StatusKind::DataLoss,
    StatusKind::Unknown,
    StatusKind::Internal,
    StatusKind::NotImplemented,
    StatusKind::Unavailable,
    StatusKind::DeadlineExceeded,
];

impl StatusKind {
    /// Maps a numeric wire code (the kind's position in the taxonomy,
    /// `InvalidArgument = 0` through `DeadlineExceeded = 15`) to a kind.
    ///
    /// Total: anything outside the taxonomy is [`StatusKind::Internal`].
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| ALL.get(i).copied())
            .unwrap_or(Self::Internal)
    }

    /// Canonical status string carried in the error envelope.
    pub fn as_str(self) -> &'static str {
        status_of(self).0
    }

    /// HTTP status code the error response is sent with.
    pub fn http_code(self) -> u16 {
        status_of(self).1
    }

    /// Same as [`http_code`](Self::http_code), as an [`http::StatusCode`].
    pub fn status_code(self) -> StatusCode {
        // 499 is non-standard but inside the range `StatusCode` accepts.
        StatusCode::from_u16(self.http_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// The fixed taxonomy table: kind → (status string, HTTP code).
pub fn status_of(kind: StatusKind) -> (&'static str, u16) {
    match kind {
        StatusKind::InvalidArgument    => ("INVALID_ARGUMENT", 400),
        StatusKind::FailedPrecondition => ("FAILED_PRECONDITION", 400),
        StatusKind::OutOfRange         => ("OUT_OF_RANGE", 400),
        StatusKind::Unauthenticated    => ("UNAUTHENTICATED", 401),
        StatusKind::PermissionDenied   => ("PERMISSION_DENIED", 403),
        StatusKind::NotFound           => ("NOT_FOUND", 404),
        StatusKind::Aborted            => ("ABORTED", 409),
        StatusKind::AlreadyExists      => ("ALREADY_EXISTS", 409),
        StatusKind::ResourceExhausted  => ("RESOURCE_EXHAUSTED", 429),
        StatusKind::Cancelled          => ("CANCELLED", 499),
        StatusKind::DataLoss           => ("DATA_LOSS", 500),
        StatusKind::Unknown            => ("UNKNOWN", 500),
        StatusKind::Internal           => ("INTERNAL", 500),
        StatusKind::NotImplemented     => ("NOT_IMPLEMENTED", 501),
        StatusKind::Unavailable        => ("UNAVAILABLE", 503),
        StatusKind::DeadlineExceeded   => ("DEADLINE_EXCEEDED", 504),
    }
}

/// Parses a canonical status string (e.g. `"NOT_FOUND"`). Case-sensitive.
impl FromStr for StatusKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.into_iter().find(|k| k.as_str() == s).ok_or(())
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_wire_contract() {
        let expected = [
            ("INVALID_ARGUMENT", 400),
            ("FAILED_PRECONDITION", 400),
            ("OUT_OF_RANGE", 400),
            ("UNAUTHENTICATED", 401),
            ("PERMISSION_DENIED", 403),
            ("NOT_FOUND", 404),
            ("ABORTED", 409),
            ("ALREADY_EXISTS", 409),
            ("RESOURCE_EXHAUSTED", 429),
            ("CANCELLED", 499),
            ("DATA_LOSS", 500),
            ("UNKNOWN", 500),
            ("INTERNAL", 500),
            ("NOT_IMPLEMENTED", 501),
            ("UNAVAILABLE", 503),
            ("DEADLINE_EXCEEDED", 504),
        ];
        for (kind, pair) in ALL.into_iter().zip(expected) {
            assert_eq!(status_of(kind), pair);
            assert_eq!(kind.status_code().as_u16(), pair.1);
        }
    }

    #[test]
    fn out_of_range_codes_are_internal() {
        assert_eq!(StatusKind::from_code(-1), StatusKind::Internal);
        assert_eq!(StatusKind::from_code(16), StatusKind::Internal);
        assert_eq!(status_of(StatusKind::from_code(99)), status_of(StatusKind::Internal));
        assert_eq!(StatusKind::from_code(5), StatusKind::NotFound);
    }

    #[test]
    fn parses_canonical_strings() {
        assert_eq!("ALREADY_EXISTS".parse::<StatusKind>(), Ok(StatusKind::AlreadyExists));
        assert_eq!("not_found".parse::<StatusKind>(), Err(()));
    }
}
