// src/catalog/mod.rs
pub mod fixture;
pub mod http;
pub mod query;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::catalog::query::QueryDescriptor;

/// Catalog identifier. The API sends numeric or string ids; both normalize to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for AssetId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            UInt(u64),
            Int(i64),
            Float(f64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(AssetId(s)),
            RawId::UInt(n) => Ok(AssetId(n.to_string())),
            RawId::Int(n) => Ok(AssetId(n.to_string())),
            // 42.0 is the same asset as 42
            RawId::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Ok(AssetId(format!("{}", f as i64)))
            }
            RawId::Float(f) => Ok(AssetId(f.to_string())),
        }
    }
}

/// One catalog item. Only `id` carries identity; everything else rides along.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Asset {
    pub fn new(id: impl Into<AssetId>) -> Self {
        Self {
            id: id.into(),
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.payload.get("title").and_then(|v| v.as_str())
    }

    /// Title when present, id otherwise. Used by human-facing sinks.
    pub fn label(&self) -> String {
        match self.title() {
            Some(t) => format!("{t} ({})", self.id),
            None => self.id.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<Asset>>;
    fn name(&self) -> &'static str;
}
