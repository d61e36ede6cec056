pub mod auth;
pub mod catalog;
pub mod history;
pub mod items;
pub mod stock;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{errors::ServiceError, models::User};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Raw bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| BearerToken(token.trim().to_string()))
            .filter(|token| !token.0.is_empty())
            .ok_or_else(|| ServiceError::Unauthorized("Missing bearer token".to_string()))
    }
}

/// Signed-in user behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        state.auth.authenticate(&token).map(CurrentUser)
    }
}
