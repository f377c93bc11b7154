//! Content-addressed cache for selection results.
//!
//! Selection is deterministic and expensive (up to 64 fits), so repeated
//! invocation with an identical series and configuration should not refit.
//! The key is a SHA-256 digest of the series values, the seasonal period and
//! the strategy: any input change misses by construction, which is the whole
//! invalidation story.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::DailySeries;
use crate::error::Result;
use crate::selection::{select_model, SearchStrategy, SelectedModel, SelectorConfig};

/// Process-local cache of selection results.
#[derive(Debug, Default)]
pub struct SelectionCache {
    entries: HashMap<[u8; 32], Arc<SelectedModel>>,
}

impl SelectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached selection for this (series, config) pair, running the
    /// search on a miss.
    pub fn get_or_select(
        &mut self,
        series: &DailySeries,
        config: &SelectorConfig,
    ) -> Result<Arc<SelectedModel>> {
        let key = cache_key(series, config);
        if let Some(hit) = self.entries.get(&key) {
            debug!(order = %hit.spec, "selection cache hit");
            return Ok(Arc::clone(hit));
        }

        let selected = Arc::new(select_model(series, config)?);
        self.entries.insert(key, Arc::clone(&selected));
        Ok(selected)
    }

    /// Number of cached selections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached selections.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn cache_key(series: &DailySeries, config: &SelectorConfig) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for value in series.values() {
        hasher.update(value.to_le_bytes());
    }
    hasher.update((config.seasonal_period as u64).to_le_bytes());
    match &config.strategy {
        SearchStrategy::ExhaustiveGrid => hasher.update([0u8]),
        SearchStrategy::AutoSearch => hasher.update([1u8]),
        SearchStrategy::FixedOrder(spec) => {
            hasher.update([2u8]);
            for component in [spec.p, spec.d, spec.q, spec.cap_p, spec.cap_d, spec.cap_q, spec.s] {
                hasher.update((component as u64).to_le_bytes());
            }
        }
    }
    hasher.finalize().into()
}
