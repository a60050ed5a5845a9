//! `AuthUser` extractor: verifies the bearer token, then the caller's account.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use murmur_core::error::AppError;
use murmur_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = authenticate(state, &parts.headers).await?;

        // Account must still exist and be verified
        state.account_service.require_verified(ctx.user_id).await?;

        Ok(AuthUser(ctx))
    }
}

/// Verify the bearer token in `headers`. Does not look at the account.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<RequestContext, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

    let user_id = state.verifier.verify(token.trim()).await?;
    Ok(RequestContext::new(user_id))
}
