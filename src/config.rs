// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::query::{AreaSelection, ContentSelection};

pub const ENV_CONFIG_PATH: &str = "NEW_ASSETS_CONFIG_PATH";
const DEFAULT_TOML_PATH: &str = "config/new_assets.toml";
const DEFAULT_JSON_PATH: &str = "config/new_assets.json";

fn default_interval_secs() -> u64 {
    300
}
fn default_assets_path() -> String {
    "/assets".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub content: ContentSelection,
    #[serde(default)]
    pub area: AreaSelection,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            content: ContentSelection::default(),
            area: AreaSelection::default(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_assets_path")]
    pub assets_path: String,
    /// "ENV" means: read from CATALOG_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            assets_path: default_assets_path(),
            api_key: None,
            app_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinksConfig {
    /// Log every new asset through tracing.
    #[serde(default = "default_true")]
    pub log: bool,
    #[serde(default)]
    pub discord_webhook: Option<String>,
    #[serde(default)]
    pub slack_webhook: Option<String>,
    /// Enables the SMTP sink; the transport itself is configured from env.
    #[serde(default)]
    pub email: bool,
}

impl Default for SinksConfig {
    fn default() -> Self {
        Self {
            log: true,
            discord_webhook: None,
            slack_webhook: None,
            email: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub sinks: SinksConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, ext.as_str())?;
        cfg.apply_env_overrides()?;
        cfg.finish()?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $NEW_ASSETS_CONFIG_PATH
    /// 2) config/new_assets.toml
    /// 3) config/new_assets.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides()?;
        cfg.finish()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_nonempty("POLL_INTERVAL_SECS") {
            self.poll.interval_secs = v
                .parse()
                .with_context(|| format!("POLL_INTERVAL_SECS is not a number: {v}"))?;
        }
        if let Some(v) = env_nonempty("POLL_CONTENT") {
            self.poll.content = v.parse()?;
        }
        if let Some(v) = env_nonempty("POLL_AREA") {
            self.poll.area = v.parse()?;
        }
        if let Some(v) = env_nonempty("CATALOG_BASE_URL") {
            self.catalog.base_url = v;
        }
        if let Some(v) = env_nonempty("DISCORD_WEBHOOK_URL") {
            self.sinks.discord_webhook = Some(v);
        }
        if let Some(v) = env_nonempty("SLACK_WEBHOOK_URL") {
            self.sinks.slack_webhook = Some(v);
        }
        if let Some(v) = env_nonempty("HTTP_BIND") {
            self.http.bind = v;
        }
        Ok(())
    }

    /// Resolve indirections and reject values the poller cannot run with.
    fn finish(&mut self) -> Result<()> {
        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be greater than 0");
        }
        if self.catalog.timeout_secs == 0 {
            self.catalog.timeout_secs = default_timeout_secs();
        }
        if let Some(key) = &self.catalog.api_key {
            if key.trim().eq_ignore_ascii_case("env") {
                let resolved = std::env::var("CATALOG_API_KEY")
                    .map_err(|_| anyhow!("Missing CATALOG_API_KEY env var"))?;
                self.catalog.api_key = Some(resolved);
            }
        }
        Ok(())
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AppConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing JSON config");
    }
    toml::from_str(s).context("parsing TOML config")
}
