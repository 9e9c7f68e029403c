//! Chain data source interface

use crate::{Blockchain, RawTransaction, Result};
use async_trait::async_trait;

/// Capability to list transactions for an address on a given chain.
///
/// Implementations return newest-first. A failure is surfaced as a
/// retryable [`crate::Error`], never as a partially filled transaction.
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Get source name
    fn name(&self) -> &str;

    /// Whether this source can serve the given chain
    fn supports(&self, blockchain: Blockchain) -> bool;

    /// Fetch transactions involving `address`
    async fn fetch_transactions(
        &self,
        address: &str,
        blockchain: Blockchain,
    ) -> Result<Vec<RawTransaction>>;
}
