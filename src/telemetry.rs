use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("poller_cycles_total", "Poll cycles started.");
        describe_counter!(
            "poller_fetch_errors_total",
            "Cycles abandoned because a catalog fetch failed."
        );
        describe_counter!(
            "poller_empty_results_total",
            "Cycles where every fetch succeeded but returned no assets."
        );
        describe_counter!(
            "poller_new_assets_total",
            "Assets reported as new to the sinks."
        );
        describe_counter!(
            "poller_sink_errors_total",
            "Emissions the sinks failed to deliver."
        );
        describe_gauge!(
            "poller_seen_assets",
            "Identifiers in the current seen-set snapshot."
        );
        describe_gauge!(
            "poller_last_cycle_ts",
            "Unix ts when the last cycle finished."
        );
        describe_histogram!("poller_fetch_ms", "Catalog fetch time per cycle in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
