use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::accounts::repo;
use crate::accounts::repo_types::Account;
use crate::auth::claims::TokenKind;
use crate::auth::services::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the authenticated caller's account from a Bearer token.
///
/// Rejects when the header is missing, the token is invalid or expired, the
/// account is gone, or the token predates a password change.
pub struct CurrentAccount(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated("missing Authorization header"))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated("invalid auth scheme"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys
            .verify(token)
            .map_err(|_| ApiError::Unauthenticated("invalid or expired token"))?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthenticated("access token required"));
        }

        let account = repo::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated("account no longer exists"))?;

        // Stale after a password change; the client must use the re-issued
        // pair from the update response (or log in again).
        if !keys.is_current(&claims, &account) {
            return Err(ApiError::Unauthenticated("token no longer valid"));
        }

        Ok(CurrentAccount(account))
    }
}
