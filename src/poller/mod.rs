// src/poller/mod.rs
//! Poll-diff engine: plan the queries, fetch them concurrently, diff the
//! merged result against the previous snapshot and hand new assets to a sink.
//!
//! One driver task owns the [`NoveltyTracker`]; cycles never overlap, so the
//! seen-set needs no locking. The next cycle is scheduled `interval` after the
//! previous one finished, which lets slow fetches stretch the cadence.

pub mod error;
pub mod novelty;
pub mod status;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalog::query::{plan_queries, AreaSelection, ContentSelection, QueryDescriptor};
use crate::catalog::{Asset, CatalogClient};
use crate::config::PollConfig;
use crate::sink::{AssetSink, NewAssets};
use crate::telemetry::ensure_metrics_described;

pub use error::CycleError;
pub use novelty::{Novelty, NoveltyTracker};
pub use status::{Status, StatusBoard, StatusSnapshot};

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// First non-empty cycle: snapshot established, nothing emitted.
    Baselined { seen: usize },
    /// Snapshot replaced; `new` assets went to the sink.
    Checked { new: usize, seen: usize },
    /// Cycle ended early; state untouched.
    Skipped(CycleError),
    /// Cancellation arrived while fetching or delivering; the batch was dropped.
    Discarded,
}

/// Run every query concurrently and concatenate the responses.
/// The first failing fetch fails the whole batch; nothing partial is returned.
pub async fn fetch_all(
    catalog: &dyn CatalogClient,
    queries: &[QueryDescriptor],
) -> Result<Vec<Asset>, CycleError> {
    let fetches = queries.iter().map(|q| async move {
        catalog.fetch(q).await.map_err(|e| CycleError::Fetch {
            query: q.to_string(),
            reason: format!("{e:#}"),
        })
    });
    let responses = try_join_all(fetches).await?;
    Ok(responses.into_iter().flatten().collect())
}

pub struct Poller {
    content: ContentSelection,
    area: AreaSelection,
    catalog: Arc<dyn CatalogClient>,
    sink: Arc<dyn AssetSink>,
    tracker: NoveltyTracker,
    status: StatusBoard,
    warned_no_queries: bool,
}

impl Poller {
    pub fn new(catalog: Arc<dyn CatalogClient>, sink: Arc<dyn AssetSink>) -> Self {
        Self {
            content: ContentSelection::default(),
            area: AreaSelection::default(),
            catalog,
            sink,
            tracker: NoveltyTracker::new(),
            status: StatusBoard::new(),
            warned_no_queries: false,
        }
    }

    pub fn from_config(
        cfg: &PollConfig,
        catalog: Arc<dyn CatalogClient>,
        sink: Arc<dyn AssetSink>,
    ) -> Self {
        Self::new(catalog, sink).with_selection(cfg.content, cfg.area)
    }

    pub fn with_selection(mut self, content: ContentSelection, area: AreaSelection) -> Self {
        self.content = content;
        self.area = area;
        self
    }

    /// Share an existing board (e.g. one already handed to the HTTP layer).
    pub fn with_status(mut self, status: StatusBoard) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn tracker(&self) -> &NoveltyTracker {
        &self.tracker
    }

    /// One plan → fetch → diff → emit pass.
    pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> CycleOutcome {
        ensure_metrics_described();
        counter!("poller_cycles_total").increment(1);
        self.status.cycle_started();

        let queries = plan_queries(self.content, self.area);
        if queries.is_empty() {
            let err = CycleError::NoQueries;
            if !self.warned_no_queries {
                tracing::warn!(target: "poller", content = ?self.content, "{err}; skipping cycles");
                self.warned_no_queries = true;
            }
            self.status.set(Status::Error(err.to_string()));
            return CycleOutcome::Skipped(err);
        }

        let t0 = Instant::now();
        let fetched = fetch_all(self.catalog.as_ref(), &queries).await;
        histogram!("poller_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if cancel.is_cancelled() {
            tracing::info!(target: "poller", "cancelled during fetch; discarding results");
            self.status.set(Status::Stopped);
            return CycleOutcome::Discarded;
        }

        let assets = match fetched {
            Ok(a) => a,
            Err(err) => {
                tracing::warn!(target: "poller", catalog = self.catalog.name(), "{err}");
                counter!("poller_fetch_errors_total").increment(1);
                self.status.set(Status::Error(err.to_string()));
                return CycleOutcome::Skipped(err);
            }
        };

        if assets.is_empty() {
            tracing::warn!(target: "poller", queries = queries.len(), "no assets in the responses");
            counter!("poller_empty_results_total").increment(1);
            self.status.set(Status::NoResults);
            return CycleOutcome::Skipped(CycleError::EmptyResult);
        }

        let fetched_count = assets.len();
        let Novelty { first_run, fresh } = self.tracker.observe(assets);
        let seen = self.tracker.len();
        gauge!("poller_seen_assets").set(seen as f64);
        self.status.record_snapshot(seen, fresh.len());

        if first_run {
            tracing::info!(target: "poller", assets = fetched_count, seen, "baseline established");
            self.status.set(Status::Sent(0));
            return CycleOutcome::Baselined { seen };
        }

        let new = fresh.len();
        tracing::info!(target: "poller", assets = fetched_count, seen, new, "cycle checked");
        if new > 0 {
            let batch = NewAssets::new(fresh);
            // A sink that never returns must not hold shutdown hostage.
            let delivered = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(target: "poller", new, "cancelled during delivery");
                    self.status.set(Status::Stopped);
                    return CycleOutcome::Discarded;
                }
                r = self.sink.deliver(&batch) => r,
            };
            if let Err(e) = delivered {
                tracing::warn!(target: "poller", sink = self.sink.name(), "emission failed: {e:#}");
                counter!("poller_sink_errors_total").increment(1);
                self.status.set(Status::Error(format!("delivery failed: {e:#}")));
                return CycleOutcome::Checked { new, seen };
            }
            counter!("poller_new_assets_total").increment(new as u64);
        }
        self.status.set(Status::Sent(new));
        CycleOutcome::Checked { new, seen }
    }

    /// Drive cycles until `cancel` fires. The first cycle starts after one
    /// scheduler yield; each later one `interval` after the previous finished.
    /// Returns the poller so callers can inspect the final state.
    pub async fn run(mut self, interval: Duration, cancel: CancellationToken) -> Self {
        tokio::task::yield_now().await;

        let mut cycle: u64 = 0;
        while !cancel.is_cancelled() {
            cycle += 1;
            let outcome = self.run_cycle(&cancel).await;
            tracing::debug!(target: "poller", cycle, ?outcome, "cycle finished");
            gauge!("poller_last_cycle_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.status.set(Status::Stopped);
        tracing::info!(target: "poller", cycles = cycle, "poller stopped");
        self
    }

    /// Spawn the driver on the tokio runtime.
    pub fn spawn(self, interval: Duration) -> PollerHandle {
        let cancel = CancellationToken::new();
        let status = self.status.clone();
        let join = tokio::spawn(self.run(interval, cancel.clone()));
        PollerHandle {
            cancel,
            status,
            join,
        }
    }
}

/// Owner-side handle of a spawned poller.
pub struct PollerHandle {
    cancel: CancellationToken,
    status: StatusBoard,
    join: JoinHandle<Poller>,
}

impl PollerHandle {
    /// Stop scheduling further cycles. A fetch already in flight finishes but
    /// its results are not applied.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel and wait for the driver to exit.
    pub async fn shutdown(self) -> Result<Poller> {
        self.cancel.cancel();
        self.join.await.context("poller task failed")
    }
}
