// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod poller;
pub mod sink;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::catalog::query::{plan_queries, AreaSelection, ContentSelection, QueryDescriptor};
pub use crate::catalog::{Asset, AssetId, CatalogClient};
pub use crate::poller::{CycleError, CycleOutcome, Poller, PollerHandle, Status, StatusBoard};
pub use crate::sink::{AssetSink, NewAssets, SinkMux};

use std::sync::Arc;

use crate::catalog::http::HttpCatalogClient;
use crate::config::AppConfig;

/// Build a poller wired to the HTTP catalog and the sinks named in `cfg`.
pub fn poller_from_config(cfg: &AppConfig, status: StatusBoard) -> anyhow::Result<Poller> {
    if cfg.catalog.base_url.trim().is_empty() {
        anyhow::bail!(
            "catalog.base_url is not configured (set it in the config file or CATALOG_BASE_URL)"
        );
    }
    let catalog = HttpCatalogClient::from_config(&cfg.catalog);
    let sinks = SinkMux::from_config(&cfg.sinks);
    if sinks.is_empty() {
        tracing::warn!("no sinks configured; new assets will only show up in /status");
    }
    Ok(Poller::from_config(&cfg.poll, Arc::new(catalog), Arc::new(sinks)).with_status(status))
}
