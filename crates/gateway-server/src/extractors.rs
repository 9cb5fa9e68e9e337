//! Custom Axum extractors for the gateway.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use gateway_core::AccountId;

use crate::error::ApiError;

/// Account the request acts as.
///
/// Authentication middleware runs outside this crate and inserts this value
/// into the request extensions. Requests without it are rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount(pub AccountId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Missing authenticated account"))
    }
}
