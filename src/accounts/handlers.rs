use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    accounts::{
        dto::{
            AccountResponse, CreateAccountRequest, Pagination, UpdateAccountRequest,
            UpdatedAccountResponse,
        },
        policy::{self, Action},
        repo, services,
    },
    auth::{extractors::CurrentAccount, services::JwtKeys},
    error::ApiError,
    state::AppState,
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:username",
            get(retrieve_account)
                .put(update_account)
                .patch(update_account)
                .delete(delete_account),
        )
}

#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    policy::authorize(Action::List, None, None)?;
    let accounts = repo::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// Registration. Goes through the store so the password is always hashed
/// before persistence.
#[instrument(skip(state, payload))]
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    policy::authorize(Action::Create, None, None)?;
    let fields = payload.validate()?;
    let account = services::create_account(&state.db, fields).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

#[instrument(skip(state))]
pub async fn retrieve_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    policy::authorize(Action::Retrieve, None, None)?;
    let account = repo::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no account with username {username}")))?;
    Ok(Json(AccountResponse::from(account)))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
    CurrentAccount(caller): CurrentAccount,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<UpdatedAccountResponse>, ApiError> {
    let target = repo::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no account with username {username}")))?;
    policy::authorize(Action::Update, Some(&caller), Some(&target))?;

    let (saved, password_changed) = services::apply_update(&state.db, target, payload).await?;

    // A password change invalidates every outstanding token for the
    // account; hand the acting session a fresh pair so it stays valid.
    let (access_token, refresh_token) = if password_changed {
        let keys = JwtKeys::from_ref(&state);
        (
            Some(keys.sign_access(&saved)?),
            Some(keys.sign_refresh(&saved)?),
        )
    } else {
        (None, None)
    };

    Ok(Json(UpdatedAccountResponse {
        account: AccountResponse::from(saved),
        access_token,
        refresh_token,
    }))
}

#[instrument(skip(state, caller))]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
    CurrentAccount(caller): CurrentAccount,
) -> Result<StatusCode, ApiError> {
    let target = repo::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no account with username {username}")))?;
    policy::authorize(Action::Delete, Some(&caller), Some(&target))?;

    repo::delete(&state.db, target.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
