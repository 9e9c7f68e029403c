//! In-memory chain data source
//!
//! Canned transactions keyed by address, with optional injected failures.
//! Used for offline analysis of exported data and throughout the tests.

use crate::source::ChainDataSource;
use crate::{Blockchain, Error, RawTransaction, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Chain data source served from memory
#[derive(Debug, Default)]
pub struct InMemoryChainSource {
    chains: HashSet<Blockchain>,
    transactions: HashMap<String, Vec<RawTransaction>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryChainSource {
    /// Create a source serving the given chains
    pub fn new(chains: impl IntoIterator<Item = Blockchain>) -> Self {
        Self {
            chains: chains.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Register transactions for an address (newest first)
    pub fn with_transactions(mut self, address: &str, txs: Vec<RawTransaction>) -> Self {
        self.transactions
            .entry(address.to_string())
            .or_default()
            .extend(txs);
        self
    }

    /// Make every fetch for `address` fail with a transport error
    pub fn with_failure(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// Addresses fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChainDataSource for InMemoryChainSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn supports(&self, blockchain: Blockchain) -> bool {
        self.chains.contains(&blockchain)
    }

    async fn fetch_transactions(
        &self,
        address: &str,
        _blockchain: Blockchain,
    ) -> Result<Vec<RawTransaction>> {
        self.calls.lock().push(address.to_string());

        if self.failing.contains(address) {
            return Err(Error::Transport(format!("injected failure for {}", address)));
        }

        Ok(self.transactions.get(address).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn raw(hash: &str) -> RawTransaction {
        RawTransaction {
            tx_hash: hash.to_string(),
            blockchain: Blockchain::Ethereum,
            from_address: "0xa".to_string(),
            to_address: "0xb".to_string(),
            value: Decimal::ONE,
            value_usd: None,
            block_number: 0,
            block_timestamp: None,
            input: None,
        }
    }

    #[tokio::test]
    async fn test_serves_registered_transactions() {
        let source = InMemoryChainSource::new([Blockchain::Ethereum])
            .with_transactions("0xa", vec![raw("1"), raw("2")])
            .with_failure("0xdead");

        assert!(source.supports(Blockchain::Ethereum));
        assert!(!source.supports(Blockchain::Bitcoin));
        assert_eq!(source.fetch_transactions("0xa", Blockchain::Ethereum).await.unwrap().len(), 2);
        assert!(source.fetch_transactions("0xb", Blockchain::Ethereum).await.unwrap().is_empty());
        assert!(source
            .fetch_transactions("0xdead", Blockchain::Ethereum)
            .await
            .unwrap_err()
            .is_retryable());
        assert_eq!(source.calls(), vec!["0xa", "0xb", "0xdead"]);
    }
}
