//! Regulatory list adapters
//!
//! Each feed downloads one source-native document and turns it into
//! single-source [`SanctionedEntity`] records. Adapters only ever emit
//! records with a non-empty name.

mod eu;
mod ofac;
mod uk;

pub use eu::EuFeed;
pub use ofac::OfacFeed;
pub use uk::UkFeed;

use crate::error::{ComplianceError, Result};
use crate::exchanges;
use crate::types::{SanctionedEntity, SanctionsSource};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

#[async_trait]
pub trait SanctionsFeed: Send + Sync {
    fn source(&self) -> SanctionsSource;

    /// Download the raw list
    async fn fetch_raw(&self) -> Result<String>;

    /// Parse a raw list into Russia-linked records
    fn parse(&self, document: &str) -> Result<Vec<SanctionedEntity>>;

    async fn fetch(&self) -> Result<Vec<SanctionedEntity>> {
        let document = self.fetch_raw().await?;
        let entities = self.parse(&document)?;
        info!(source = %self.source(), count = entities.len(), "Parsed Russia-linked entries");
        Ok(entities)
    }
}

pub(crate) async fn download(client: &Client, url: &str, feed: SanctionsSource) -> Result<String> {
    info!(%feed, url, "Fetching sanctions list");

    let unavailable = |e: reqwest::Error| ComplianceError::FeedUnavailable {
        feed,
        reason: e.to_string(),
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(unavailable)?
        .error_for_status()
        .map_err(unavailable)?;

    response.text().await.map_err(unavailable)
}

/// Drop nameless records and tag known exchanges
pub(crate) fn finalize(entities: Vec<SanctionedEntity>) -> Vec<SanctionedEntity> {
    entities
        .into_iter()
        .filter_map(|mut entity| {
            entity.name = entity.name.trim().to_string();
            if entity.name.is_empty() {
                debug!("Dropping record without a name");
                return None;
            }
            exchanges::classify(&mut entity);
            Some(entity)
        })
        .collect()
}

/// Non-empty trimmed text, if any
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityType;

    #[test]
    fn test_finalize_drops_blank_names() {
        let entities = vec![
            SanctionedEntity::new("  ", EntityType::Company, SanctionsSource::Uk),
            SanctionedEntity::new(" Garantex ", EntityType::Company, SanctionsSource::Uk),
        ];

        let kept = finalize(entities);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Garantex");
        assert!(kept[0].is_exchange);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
