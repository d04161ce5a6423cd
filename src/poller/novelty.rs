// src/poller/novelty.rs
use std::collections::HashSet;

use crate::catalog::{Asset, AssetId};

/// Result of diffing one cycle against the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Novelty {
    /// No baseline existed; nothing is reported as new.
    pub first_run: bool,
    /// New assets in fetch order, one per identifier.
    pub fresh: Vec<Asset>,
}

/// Tracks the identifiers seen in the last successful, non-empty cycle.
///
/// The snapshot is replaced wholesale on every observation. An id that drops
/// out of the catalog is forgotten and counts as new again if it comes back.
#[derive(Debug, Clone, Default)]
pub struct NoveltyTracker {
    seen: HashSet<AssetId>,
}

impl NoveltyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_baselined(&self) -> bool {
        !self.seen.is_empty()
    }

    pub fn seen(&self) -> &HashSet<AssetId> {
        &self.seen
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Diff `assets` against the current snapshot, then make their ids the new
    /// snapshot. An empty cycle result is a no-op and keeps the old snapshot.
    pub fn observe(&mut self, assets: Vec<Asset>) -> Novelty {
        if assets.is_empty() {
            return Novelty::default();
        }

        let first_run = self.seen.is_empty();
        let mut current: HashSet<AssetId> = HashSet::with_capacity(assets.len());
        let mut fresh = Vec::new();

        for asset in assets {
            // `current.insert` doubles as the per-cycle duplicate check.
            if !current.insert(asset.id.clone()) {
                continue;
            }
            if !first_run && !self.seen.contains(&asset.id) {
                fresh.push(asset);
            }
        }

        self.seen = current;
        Novelty { first_run, fresh }
    }
}
