//! Identity-token verification hook.
//!
//! The crate never checks signatures itself. Plug in anything that can turn
//! a bearer token into a subject id: an OIDC library, a call to an auth
//! service, a test double.

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderValue;

use crate::error::CallError;
use crate::status::StatusKind;

/// Verifies an identity token and returns the subject (user) id it names.
///
/// Any error (expired, malformed, revoked, network) is reported to the
/// client as `UNAUTHENTICATED "invalid ID token: <error>"`.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    async fn verify(&self, token: &str) -> anyhow::Result<String>;
}

/// Identity verification settings for a [`Callable`](crate::Callable).
#[derive(Clone)]
pub struct AuthConfig {
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Reject calls without an `Authorization` header. When `false`, such
    /// calls go through with no subject id.
    pub required: bool,
}

impl AuthConfig {
    pub fn new(verifier: impl IdentityVerifier, required: bool) -> Self {
        Self { verifier: Arc::new(verifier), required }
    }

    /// Runs the check for one request. `Ok(None)` means anonymous.
    ///
    /// A header that is present but not visible ASCII counts as malformed,
    /// never as absent.
    pub(crate) async fn authenticate(&self, authorization: Option<&HeaderValue>) -> Result<Option<String>, CallError> {
        let raw = match authorization.map(HeaderValue::to_str) {
            None => "",
            Some(Ok(raw)) => raw,
            Some(Err(_)) => return Err(unauthenticated("unsupported Authorization header")),
        };
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let token = match parts.as_slice() {
            [] if self.required => return Err(unauthenticated("missing Authorization header")),
            [] => return Ok(None),
            ["Bearer", token] => *token,
            _ => return Err(unauthenticated("unsupported Authorization header")),
        };

        self.verifier
            .verify(token)
            .await
            .map(Some)
            .map_err(|e| unauthenticated(&format!("invalid ID token: {e}")))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").field("required", &self.required).finish_non_exhaustive()
    }
}

fn unauthenticated(message: &str) -> CallError {
    CallError::new(StatusKind::Unauthenticated, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl IdentityVerifier for Fixed {
        async fn verify(&self, token: &str) -> anyhow::Result<String> {
            match token {
                "good" => Ok("user-1".to_owned()),
                _ => anyhow::bail!("token expired"),
            }
        }
    }

    #[tokio::test]
    async fn valid_bearer_yields_subject() {
        let auth = AuthConfig::new(Fixed, true);
        assert_eq!(auth.authenticate(Some(&HeaderValue::from_static("Bearer good"))).await, Ok(Some("user-1".to_owned())));
    }

    #[tokio::test]
    async fn missing_header() {
        let required = AuthConfig::new(Fixed, true);
        let err = required.authenticate(None).await.unwrap_err();
        assert_eq!(err, unauthenticated("missing Authorization header"));

        let optional = AuthConfig::new(Fixed, false);
        assert_eq!(optional.authenticate(None).await, Ok(None));
    }

    #[tokio::test]
    async fn malformed_header() {
        let auth = AuthConfig::new(Fixed, false);
        for header in ["Basic dXNlcg==", "Bearer", "bearer good", "Bearer good extra"] {
            let err = auth.authenticate(Some(&HeaderValue::from_static(header))).await.unwrap_err();
            assert_eq!(err.message(), "unsupported Authorization header", "{header}");
        }
    }

    #[tokio::test]
    async fn non_ascii_header_is_malformed_not_missing() {
        let header = HeaderValue::from_bytes(b"Bearer t\xe9st").unwrap();
        for required in [true, false] {
            let auth = AuthConfig::new(Fixed, required);
            let err = auth.authenticate(Some(&header)).await.unwrap_err();
            assert_eq!(err, unauthenticated("unsupported Authorization header"));
        }
    }

    #[tokio::test]
    async fn verifier_failure_is_wrapped() {
        let auth = AuthConfig::new(Fixed, true);
        let err = auth.authenticate(Some(&HeaderValue::from_static("Bearer stale"))).await.unwrap_err();
        assert_eq!(err, unauthenticated("invalid ID token: token expired"));
    }
}
