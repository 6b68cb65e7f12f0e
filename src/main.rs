use tokio_util::sync::CancellationToken;

mod app;
mod auth;
mod catalog;
mod config;
mod ledger;
mod meals;
mod plans;
mod scheduler;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "befit=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;

    app_state.migrate().await?;
    tracing::info!("migrations applied");

    let shutdown = CancellationToken::new();
    let reset_task = tokio::spawn(scheduler::run_daily_reset(
        app_state.ledger.clone(),
        app_state.config.reset.clone(),
        shutdown.child_token(),
    ));

    let result = app::serve(app::build_app(app_state)).await;

    shutdown.cancel();
    if let Err(e) = reset_task.await {
        tracing::error!(error = %e, "reset scheduler task panicked");
    }
    result
}
