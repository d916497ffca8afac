mod accounts;
mod app;
mod auth;
mod config;
mod error;
mod state;

use error::ApiError;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "accounthub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    // Superuser bootstrap, idempotent across restarts.
    if let Some(admin) = app_state.config.admin.clone() {
        match accounts::services::create_superuser(
            &app_state.db,
            &admin.email,
            &admin.username,
            &admin.password,
        )
        .await
        {
            Ok(account) => tracing::info!(username = %account.username, "admin account created"),
            Err(ApiError::Conflict(_)) => tracing::debug!("admin account already exists"),
            Err(e) => anyhow::bail!("admin bootstrap failed: {e}"),
        }
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
