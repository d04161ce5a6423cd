//! New-assets poller: binary entrypoint.
//! Loads configuration, starts the poll loop and serves `/health`, `/status`
//! and `/metrics` until Ctrl-C.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use new_assets_poller::config::AppConfig;
use new_assets_poller::telemetry::Metrics;
use new_assets_poller::{api, poller_from_config, StatusBoard};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("new_assets_poller=info,poller=info,sink=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default().context("loading configuration")?;
    tracing::info!(
        interval_secs = cfg.poll.interval_secs,
        content = ?cfg.poll.content,
        area = ?cfg.poll.area,
        "configuration loaded"
    );

    let metrics = Metrics::init()?;
    let status = StatusBoard::new();
    let poller = poller_from_config(&cfg, status.clone())?;
    let handle = poller.spawn(cfg.poll.interval());

    let app = api::router(api::AppState::new(status)).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(&cfg.http.bind)
        .await
        .with_context(|| format!("binding {}", cfg.http.bind))?;
    tracing::info!(bind = %cfg.http.bind, "http listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {e:#}");
            }
        })
        .await
        .context("http server")?;

    let poller = handle.shutdown().await?;
    tracing::info!(seen = poller.tracker().len(), "shut down");
    Ok(())
}
