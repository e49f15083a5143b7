//! Caller identity

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use core_service::CoreError;

use crate::error::ApiError;

/// Header set by the authenticating proxy in front of the server
pub const OWNER_HEADER: &str = "x-owner-id";

/// Authenticated owner of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Owner(value.to_string()))
            .ok_or_else(|| {
                ApiError(CoreError::Unauthorized(format!(
                    "missing {} header",
                    OWNER_HEADER
                )))
            })
    }
}
