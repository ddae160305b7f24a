//! Request identity.
//!
//! The service sits behind an authenticating proxy that resolves the
//! caller and forwards the identity in `X-User-Email`. A request
//! without a resolved identity is rejected before any handler logic.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use filegate_core::AppError;

use crate::error::HttpAppError;

/// The resolved caller identity, extracted from `X-User-Email`.
pub struct UserIdentity(pub String);

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get("x-user-email")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match identity {
            Some(email) => Ok(UserIdentity(email.to_string())),
            None => Err(HttpAppError(AppError::Unauthorized(
                "X-User-Email header is required".to_string(),
            ))),
        }
    }
}
