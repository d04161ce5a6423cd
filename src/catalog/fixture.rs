// src/catalog/fixture.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::RwLock;

use crate::catalog::query::{ContentType, QueryDescriptor};
use crate::catalog::{Asset, CatalogClient};

#[derive(Debug, Default, Deserialize)]
struct FixtureDoc {
    #[serde(default)]
    movies: Vec<Asset>,
    #[serde(default)]
    seasons: Vec<Asset>,
}

/// In-memory catalog keyed by content type. Area and sort filters are ignored;
/// a query receives every asset of the content types it names.
pub struct FixtureCatalog {
    doc: RwLock<FixtureDoc>,
}

impl FixtureCatalog {
    pub fn from_fixture(content: &str) -> Result<Self> {
        let doc: FixtureDoc = serde_json::from_str(content).context("parsing catalog fixture")?;
        Ok(Self {
            doc: RwLock::new(doc),
        })
    }

    pub fn empty() -> Self {
        Self {
            doc: RwLock::new(FixtureDoc::default()),
        }
    }

    /// Publish an asset under a content type (visible from the next fetch on).
    pub fn publish(&self, content: ContentType, asset: Asset) {
        if let Ok(mut doc) = self.doc.write() {
            match content {
                ContentType::Movies => doc.movies.push(asset),
                ContentType::Seasons => doc.seasons.push(asset),
            }
        }
    }

    /// Remove an asset from every content type.
    pub fn unlist(&self, id: &str) {
        if let Ok(mut doc) = self.doc.write() {
            doc.movies.retain(|a| a.id.as_str() != id);
            doc.seasons.retain(|a| a.id.as_str() != id);
        }
    }
}

#[async_trait]
impl CatalogClient for FixtureCatalog {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<Asset>> {
        let doc = self
            .doc
            .read()
            .map_err(|_| anyhow::anyhow!("fixture catalog lock poisoned"))?;
        let mut out = Vec::new();
        for ct in ContentType::ALL {
            if !query.has_filter(ct.filter()) {
                continue;
            }
            match ct {
                ContentType::Movies => out.extend(doc.movies.iter().cloned()),
                ContentType::Seasons => out.extend(doc.seasons.iter().cloned()),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
