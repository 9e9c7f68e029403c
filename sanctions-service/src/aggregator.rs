//! Multi-source fetch-all
//!
//! All feeds are fetched concurrently. A feed that fails (download or
//! parse) contributes nothing and is listed in `failed_sources`; the others
//! are merged as usual.

use crate::config::FeedConfig;
use crate::error::Result;
use crate::feeds::{EuFeed, OfacFeed, SanctionsFeed, UkFeed};
use crate::merge::{ExactNameKey, MergeKey, SanctionsMerger};
use crate::types::{SanctionedEntity, SanctionsSource};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub entities: Vec<SanctionedEntity>,
    /// Records each feed produced before merging
    pub raw_counts: BTreeMap<SanctionsSource, usize>,
    pub failed_sources: Vec<SanctionsSource>,
}

impl AggregationReport {
    pub fn exchanges(&self) -> impl Iterator<Item = &SanctionedEntity> {
        self.entities.iter().filter(|e| e.is_exchange)
    }

    /// Merged entities designated by each source
    pub fn source_counts(&self) -> BTreeMap<SanctionsSource, usize> {
        let mut counts = BTreeMap::new();
        for entity in &self.entities {
            for source in &entity.sources {
                *counts.entry(*source).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn total_crypto_addresses(&self) -> usize {
        self.entities.iter().map(|e| e.crypto_addresses.len()).sum()
    }

    pub fn is_degraded(&self) -> bool {
        !self.failed_sources.is_empty()
    }
}

pub struct SanctionsAggregator<K = ExactNameKey> {
    feeds: Vec<Arc<dyn SanctionsFeed>>,
    merger: SanctionsMerger<K>,
}

impl SanctionsAggregator<ExactNameKey> {
    pub fn new(feeds: Vec<Arc<dyn SanctionsFeed>>) -> Self {
        Self::with_merger(feeds, SanctionsMerger::new())
    }

    /// OFAC, EU and UK feeds sharing one HTTP client
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let client = config.client()?;
        let feeds: Vec<Arc<dyn SanctionsFeed>> = vec![
            Arc::new(OfacFeed::new(client.clone(), config.ofac_sdn_url.clone())),
            Arc::new(EuFeed::new(client.clone(), config.eu_sanctions_url.clone())),
            Arc::new(UkFeed::new(client, config.uk_sanctions_url.clone())),
        ];
        Ok(Self::new(feeds))
    }
}

impl<K: MergeKey> SanctionsAggregator<K> {
    pub fn with_merger(feeds: Vec<Arc<dyn SanctionsFeed>>, merger: SanctionsMerger<K>) -> Self {
        Self { feeds, merger }
    }

    pub async fn fetch_all(&self) -> AggregationReport {
        let results = join_all(self.feeds.iter().map(|feed| async move {
            (feed.source(), feed.fetch().await)
        }))
        .await;

        let mut raw_counts = BTreeMap::new();
        let mut failed_sources = Vec::new();
        let mut collected = Vec::new();

        // Concatenate in feed registration order
        for (source, result) in results {
            match result {
                Ok(entities) => {
                    raw_counts.insert(source, entities.len());
                    collected.extend(entities);
                }
                Err(e) => {
                    warn!(%source, error = %e, "Sanctions feed failed, treating as empty");
                    raw_counts.insert(source, 0);
                    failed_sources.push(source);
                }
            }
        }

        let entities = self.merger.merge(collected);

        info!(
            total = entities.len(),
            ofac = raw_counts.get(&SanctionsSource::Ofac).copied().unwrap_or(0),
            eu = raw_counts.get(&SanctionsSource::Eu).copied().unwrap_or(0),
            uk = raw_counts.get(&SanctionsSource::Uk).copied().unwrap_or(0),
            "Merged sanctions lists"
        );

        AggregationReport {
            entities,
            raw_counts,
            failed_sources,
        }
    }
}
