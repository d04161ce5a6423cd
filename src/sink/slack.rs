use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{AssetSink, NewAssets};

const MAX_LISTED: usize = 30;

pub struct SlackSink {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackSink {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

fn slack_text(batch: &NewAssets) -> String {
    format!(
        "*{} new asset(s)* @ {}\n{}",
        batch.len(),
        batch.detected_at.to_rfc3339(),
        batch.summary(MAX_LISTED)
    )
}

#[async_trait::async_trait]
impl AssetSink for SlackSink {
    async fn deliver(&self, batch: &NewAssets) -> Result<()> {
        let body = serde_json::json!({ "text": slack_text(batch) });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
