// src/catalog/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::catalog::query::QueryDescriptor;
use crate::catalog::{Asset, CatalogClient};
use crate::config::CatalogConfig;

// --- tolerant response shapes of the assets endpoint ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssetsResponse {
    Bare(Vec<Asset>),
    Data { data: Vec<Asset> },
    Assets { assets: Vec<Asset> },
}

impl AssetsResponse {
    fn into_assets(self) -> Vec<Asset> {
        match self {
            AssetsResponse::Bare(v) => v,
            AssetsResponse::Data { data } => data,
            AssetsResponse::Assets { assets } => assets,
        }
    }
}

pub(crate) fn parse_assets_body(body: &str) -> Result<Vec<Asset>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        anyhow::bail!("catalog returned an empty body");
    }
    let resp: AssetsResponse = serde_json::from_str(trimmed)
        .with_context(|| format!("parse assets JSON failed, body: {}", truncate(trimmed, 200)))?;
    Ok(resp.into_assets())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Query-string pairs for a descriptor: repeated `filter`, then `sort` + `order`.
pub fn query_params(query: &QueryDescriptor) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = query
        .filters()
        .iter()
        .map(|f| ("filter", f.as_str().to_string()))
        .collect();
    if let Some(sort) = query.sort() {
        params.push(("sort", sort.key.clone()));
        params.push(("order", sort.direction.as_str().to_string()));
    }
    params
}

/// Catalog client talking to the assets endpoint over HTTPS.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    app_id: Option<String>,
    timeout: Duration,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/assets", base_url.trim_end_matches('/')),
            api_key: None,
            app_id: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(cfg: &CatalogConfig) -> Self {
        let path = if cfg.assets_path.starts_with('/') {
            cfg.assets_path.clone()
        } else {
            format!("/{}", cfg.assets_path)
        };
        Self {
            client: Client::new(),
            url: format!("{}{}", cfg.base_url.trim_end_matches('/'), path),
            api_key: cfg.api_key.clone(),
            app_id: cfg.app_id.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_credentials(mut self, api_key: Option<String>, app_id: Option<String>) -> Self {
        self.api_key = api_key;
        self.app_id = app_id;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<Asset>> {
        let mut req = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .query(&query_params(query));
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        if let Some(app) = &self.app_id {
            req = req.header("x-app-id", app);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("GET {} {query}", self.url))?
            .error_for_status()
            .context("catalog non-2xx")?;
        let body = resp.text().await.context("read assets body")?;

        let assets = parse_assets_body(&body)?;
        tracing::debug!(target: "catalog", query = %query, assets = assets.len(), "fetched");
        Ok(assets)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
