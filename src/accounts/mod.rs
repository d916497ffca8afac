use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub(crate) mod password;
mod policy;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::account_routes()
}
