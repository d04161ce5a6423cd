// src/sink/mod.rs
pub mod discord;
pub mod email;
pub mod slack;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::catalog::Asset;
use crate::config::SinksConfig;

/// One emission: every asset detected as new in a single cycle.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAssets {
    pub assets: Vec<Asset>,
    pub detected_at: DateTime<Utc>,
}

impl NewAssets {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            detected_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Short human-readable listing, at most `max` lines.
    pub fn summary(&self, max: usize) -> String {
        let mut lines: Vec<String> = self
            .assets
            .iter()
            .take(max)
            .map(|a| format!("• {}", a.label()))
            .collect();
        if self.assets.len() > max {
            lines.push(format!("… and {} more", self.assets.len() - max));
        }
        lines.join("\n")
    }
}

#[async_trait::async_trait]
pub trait AssetSink: Send + Sync {
    async fn deliver(&self, batch: &NewAssets) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Writes each new asset to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait::async_trait]
impl AssetSink for LogSink {
    async fn deliver(&self, batch: &NewAssets) -> Result<()> {
        for a in &batch.assets {
            tracing::info!(
                target: "sink",
                id = %a.id,
                title = a.title().unwrap_or_default(),
                "new asset"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Forwards batches into a channel; for embedding the poller in a larger app.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<NewAssets>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<NewAssets>) -> Self {
        Self { tx }
    }

    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<NewAssets>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl AssetSink for ChannelSink {
    async fn deliver(&self, batch: &NewAssets) -> Result<()> {
        self.tx
            .send(batch.clone())
            .await
            .map_err(|_| anyhow::anyhow!("new-assets receiver dropped"))
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Fans a batch out to every configured sink. One failing sink does not stop
/// the others; the mux only fails when every sink failed.
#[derive(Default)]
pub struct SinkMux {
    sinks: Vec<Box<dyn AssetSink>>,
}

impl SinkMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl AssetSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn AssetSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn from_config(cfg: &SinksConfig) -> Self {
        let mut mux = SinkMux::new();
        if cfg.log {
            mux.push(Box::new(LogSink));
        }
        if let Some(url) = &cfg.discord_webhook {
            mux.push(Box::new(discord::DiscordSink::new(url.clone())));
        }
        if let Some(url) = &cfg.slack_webhook {
            mux.push(Box::new(slack::SlackSink::new(url.clone())));
        }
        if cfg.email {
            match email::EmailSink::from_env() {
                Ok(s) => mux.push(Box::new(s)),
                Err(e) => tracing::warn!("email sink disabled: {e:#}"),
            }
        }
        mux
    }
}

#[async_trait::async_trait]
impl AssetSink for SinkMux {
    async fn deliver(&self, batch: &NewAssets) -> Result<()> {
        let mut failed = Vec::new();
        for s in &self.sinks {
            if let Err(e) = s.deliver(batch).await {
                tracing::warn!(target: "sink", sink = s.name(), "delivery failed: {e:#}");
                failed.push(s.name());
            }
        }
        if !self.sinks.is_empty() && failed.len() == self.sinks.len() {
            anyhow::bail!("all sinks failed: {}", failed.join(", "));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}
