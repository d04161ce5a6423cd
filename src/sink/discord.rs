use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{AssetSink, NewAssets};

/// Discord caps embed descriptions; keep the listing well below it.
const MAX_LISTED: usize = 20;
/// Retry delays stop doubling after this many steps.
const MAX_BACKOFF_SHIFT: u32 = 6;

/// Delay before retry number `attempt` (1-based): `base`, 2×`base`, 4×`base`...
fn backoff_delay(base: Duration, attempt: u8) -> Duration {
    let shift = u32::from(attempt.saturating_sub(1)).min(MAX_BACKOFF_SHIFT);
    base.saturating_mul(1 << shift)
}

#[derive(Clone)]
pub struct DiscordSink {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
    backoff: Duration,
}

impl DiscordSink {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff = base;
        self
    }
}

#[async_trait::async_trait]
impl AssetSink for DiscordSink {
    async fn deliver(&self, batch: &NewAssets) -> Result<()> {
        let payload = DiscordWebhookPayload::from_batch(batch);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status_ref() {
                    Ok(_) => return Ok(()),
                    Err(e) => anyhow!("Discord webhook HTTP error: {e}"),
                },
                Err(e) => anyhow!("Discord webhook request failed: {e}"),
            };
            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::debug!(target: "sink", attempt, "discord webhook failed, retrying: {err:#}");
            tokio::time::sleep(backoff_delay(self.backoff, attempt)).await;
        }
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_batch(batch: &NewAssets) -> Self {
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: format!("{} new asset(s) in the catalog", batch.len()),
                description: batch.summary(MAX_LISTED),
                timestamp: batch.detected_at.to_rfc3339(),
            }],
        }
    }
}
