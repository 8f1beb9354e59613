//! kanban-api バイナリのエントリポイント
//! API と静的ファイル（UI バンドル）を同じポートで配信します。

use anyhow::Context;
use kanban_api::{app_with_static, AppState};
use shared::{init_tracing, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(config.log_format)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::from_config(&config);
    let router = app_with_static(state, &config.static_dir);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        static_dir = %config.static_dir.display(),
        seed_demo_cards = config.seed_demo_cards,
        "server starting"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "failed to install Ctrl+C handler"),
    }
}
