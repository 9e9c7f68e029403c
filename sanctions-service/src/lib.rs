pub mod types;
pub mod error;
pub mod exchanges;
pub mod merge;
pub mod feeds;
pub mod aggregator;
pub mod index;
pub mod config;

pub use types::{CryptoAddress, EntityType, SanctionedEntity, SanctionsSource};
pub use error::ComplianceError;
pub use exchanges::{KnownExchange, KNOWN_EXCHANGES};
pub use merge::{ExactNameKey, MergeKey, NormalizedNameKey, SanctionsMerger};
pub use feeds::{EuFeed, OfacFeed, SanctionsFeed, UkFeed};
pub use aggregator::{AggregationReport, SanctionsAggregator};
pub use index::{NameMatch, SanctionsIndex};
pub use config::FeedConfig;
