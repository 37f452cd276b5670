//! `Content-Type` negotiation for call requests.

use http::HeaderValue;
use mime::Mime;

use crate::error::CallError;
use crate::status::StatusKind;

/// Accepts `application/json` with an optional UTF-8 charset.
///
/// Checked in order: present, parseable, `application/json` (any case),
/// charset `utf-8` / `utf8` if given. Other parameters are ignored.
pub fn validate(content_type: Option<&str>) -> Result<(), CallError> {
    let raw = match content_type {
        Some(ct) if !ct.trim().is_empty() => ct,
        _ => return Err(invalid("missing content type")),
    };

    let mime: Mime = raw.parse().map_err(|_| invalid("invalid content type"))?;

    if !mime.essence_str().eq_ignore_ascii_case("application/json") {
        return Err(invalid("unsupported content type"));
    }

    if let Some(charset) = mime.get_param(mime::CHARSET) {
        let charset = charset.as_str().to_ascii_lowercase();
        if charset != "utf-8" && charset != "utf8" {
            return Err(invalid("unsupported encoding"));
        }
    }

    Ok(())
}

/// [`validate`] over the raw header. A value that is present but not
/// visible ASCII is unparseable, not missing.
pub(crate) fn validate_header(content_type: Option<&HeaderValue>) -> Result<(), CallError> {
    match content_type.map(HeaderValue::to_str) {
        Some(Err(_)) => Err(invalid("invalid content type")),
        raw => validate(raw.and_then(Result::ok)),
    }
}

fn invalid(message: &str) -> CallError {
    CallError::new(StatusKind::InvalidArgument, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(ct: Option<&str>) -> String {
        validate(ct).unwrap_err().message().to_owned()
    }

    #[test]
    fn accepts_json() {
        assert!(validate(Some("application/json")).is_ok());
        assert!(validate(Some("Application/JSON")).is_ok());
        assert!(validate(Some("application/json; charset=utf-8")).is_ok());
        assert!(validate(Some("application/json; charset=UTF8")).is_ok());
        assert!(validate(Some("application/json; boundary=ignored")).is_ok());
    }

    #[test]
    fn rejects_missing() {
        assert_eq!(message(None), "missing content type");
        assert_eq!(message(Some("")), "missing content type");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(message(Some("json")), "invalid content type");
    }

    #[test]
    fn unreadable_header_is_invalid_not_missing() {
        let header = HeaderValue::from_bytes(b"application/j\xe9son").unwrap();
        assert_eq!(validate_header(Some(&header)).unwrap_err().message(), "invalid content type");
        assert_eq!(validate_header(None).unwrap_err().message(), "missing content type");
        assert!(validate_header(Some(&HeaderValue::from_static("application/json"))).is_ok());
    }

    #[test]
    fn rejects_other_media_types() {
        assert_eq!(message(Some("text/plain")), "unsupported content type");
        assert_eq!(message(Some("application/json+patch")), "unsupported content type");
    }

    #[test]
    fn rejects_other_charsets() {
        let err = validate(Some("application/json; charset=iso-8859-1")).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidArgument);
        assert_eq!(err.message(), "unsupported encoding");
    }
}
