use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    accounts::{dto::AccountResponse, password::verify_password, repo, services::is_valid_email},
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest},
        services::JwtKeys,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email address".into()));
    }

    let account = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::Unauthenticated("invalid credentials"))?;

    let ok = verify_password(&payload.password, &account.password_hash)?;
    if !ok {
        warn!(email = %payload.email, account_id = %account.id, "login invalid password");
        return Err(ApiError::Unauthenticated("invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(&account)?;
    let refresh_token = keys.sign_refresh(&account)?;

    info!(account_id = %account.id, username = %account.username, "logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        account: AccountResponse::from(account),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthenticated("invalid or expired refresh token"))?;

    let account = repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated("account no longer exists"))?;

    // Refresh tokens issued before a password change are stale too.
    if !keys.is_current(&claims, &account) {
        return Err(ApiError::Unauthenticated("token no longer valid"));
    }

    let access_token = keys.sign_access(&account)?;
    let refresh_token = keys.sign_refresh(&account)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        account: AccountResponse::from(account),
    }))
}
