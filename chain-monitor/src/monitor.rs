//! Chain monitor facade
//!
//! Routes addresses to the data source serving their chain, annotates the
//! fetched transactions and folds them into the shared profile store.

use crate::config::{MonitorConfig, TraceConfig};
use crate::profile::{AddressRiskProfile, ProfileStore};
use crate::scoring::ProfileAssessment;
use crate::source::ChainDataSource;
use crate::tracer::{EvasionNetwork, EvasionTracer};
use crate::{
    Blockchain, Error, EtherscanClient, EvasionClassifier, Result, Transaction, TronGridClient,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// Address to monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedAddress {
    /// Address
    pub address: String,
    /// Chain
    pub blockchain: Blockchain,
}

/// Monitors designated addresses across chains
pub struct ChainMonitor {
    sources: Vec<Arc<dyn ChainDataSource>>,
    classifier: Arc<EvasionClassifier>,
    profiles: Arc<ProfileStore>,
    trace_config: TraceConfig,
    high_risk_threshold: u8,
}

impl ChainMonitor {
    /// Create a monitor with no data sources registered
    pub fn new(
        classifier: Arc<EvasionClassifier>,
        profiles: Arc<ProfileStore>,
        trace_config: TraceConfig,
    ) -> Self {
        Self {
            sources: Vec::new(),
            classifier,
            profiles,
            trace_config,
            high_risk_threshold: MonitorConfig::default().high_risk_threshold,
        }
    }

    /// Score used by `high_risk_addresses` when the caller passes none
    pub fn with_high_risk_threshold(mut self, threshold: u8) -> Self {
        self.high_risk_threshold = threshold;
        self
    }

    /// Register a data source; earlier registrations win for shared chains
    pub fn with_source(mut self, source: Arc<dyn ChainDataSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Build a monitor with the Etherscan and TronGrid sources
    pub fn from_config(config: &MonitorConfig, profiles: Arc<ProfileStore>) -> Result<Self> {
        let classifier = EvasionClassifier::new(
            &config.mixer_contracts,
            config.payload_length_threshold,
        );
        let etherscan = EtherscanClient::new(
            config.etherscan_base_url.clone(),
            config.etherscan_api_key.clone(),
            config.request_timeout(),
        )?;
        let trongrid = TronGridClient::new(
            config.trongrid_base_url.clone(),
            config.trongrid_api_key.clone(),
            config.request_timeout(),
            config.trongrid_page_limit,
        )?;

        Ok(Self::new(Arc::new(classifier), profiles, config.trace.clone())
            .with_high_risk_threshold(config.high_risk_threshold)
            .with_source(Arc::new(etherscan))
            .with_source(Arc::new(trongrid)))
    }

    /// Shared profile store
    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    fn source_for(&self, blockchain: Blockchain) -> Result<Arc<dyn ChainDataSource>> {
        self.sources
            .iter()
            .find(|source| source.supports(blockchain))
            .cloned()
            .ok_or_else(|| Error::NoDataSource(blockchain.to_string()))
    }

    /// Fetch, annotate and profile one address.
    ///
    /// Caller errors (blank address, unserved chain) are rejected before
    /// any fetch. Fetch errors are returned as-is and leave the profile
    /// untouched.
    pub async fn monitor_address(
        &self,
        address: &str,
        blockchain: Blockchain,
    ) -> Result<Vec<Transaction>> {
        if address.trim().is_empty() {
            return Err(Error::InvalidAddress(address.to_string()));
        }
        let source = self.source_for(blockchain)?;

        let raw = source.fetch_transactions(address, blockchain).await?;
        let transactions: Vec<Transaction> = raw
            .into_iter()
            .map(|tx| Transaction::annotate(tx, &self.classifier))
            .collect();

        self.profiles.observe(address, blockchain, &transactions);
        Ok(transactions)
    }

    /// Monitor several addresses one after another. A failing address is
    /// logged and reported with no transactions.
    pub async fn monitor_all(&self, addresses: &[WatchedAddress]) -> BTreeMap<String, Vec<Transaction>> {
        let mut results = BTreeMap::new();

        for watched in addresses {
            let transactions = match self
                .monitor_address(&watched.address, watched.blockchain)
                .await
            {
                Ok(txs) => txs,
                Err(e) => {
                    error!(address = %watched.address, error = %e, "Failed to monitor address");
                    Vec::new()
                }
            };
            results.insert(watched.address.clone(), transactions);
        }

        info!(addresses = results.len(), "Monitoring pass complete");
        results
    }

    /// Tracer over the source serving `blockchain`
    pub fn tracer(&self, blockchain: Blockchain) -> Result<EvasionTracer> {
        Ok(EvasionTracer::new(
            self.source_for(blockchain)?,
            Arc::clone(&self.classifier),
            self.trace_config.clone(),
        ))
    }

    /// Trace the evasion network around `seed`; `None` uses the configured hop ceiling
    pub async fn trace_network(
        &self,
        seed: &str,
        blockchain: Blockchain,
        max_hops: Option<u32>,
    ) -> Result<EvasionNetwork> {
        if seed.trim().is_empty() {
            return Err(Error::InvalidAddress(seed.to_string()));
        }
        let max_hops = max_hops.unwrap_or(self.trace_config.default_max_hops);
        self.tracer(blockchain)?.trace(seed, blockchain, max_hops).await
    }

    /// Profiles scoring at or above `threshold`, or the configured
    /// threshold when `None`
    pub fn high_risk_addresses(&self, threshold: Option<u8>) -> Vec<AddressRiskProfile> {
        self.profiles.query(threshold.unwrap_or(self.high_risk_threshold))
    }

    /// Assessment of one profiled address
    pub fn assess(&self, address: &str) -> Option<ProfileAssessment> {
        self.profiles.assess(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DEFAULT_MIXER_CONTRACTS;
    use crate::{InMemoryChainSource, RawTransaction};
    use rust_decimal::Decimal;

    fn raw(hash: &str, from: &str, to: &str, usd: i64) -> RawTransaction {
        RawTransaction {
            tx_hash: hash.to_string(),
            blockchain: Blockchain::UsdtTrc20,
            from_address: from.to_string(),
            to_address: to.to_string(),
            value: Decimal::from(usd),
            value_usd: Some(Decimal::from(usd)),
            block_number: 0,
            block_timestamp: None,
            input: None,
        }
    }

    fn monitor(source: InMemoryChainSource) -> ChainMonitor {
        ChainMonitor::new(
            Arc::new(EvasionClassifier::default()),
            Arc::new(ProfileStore::new()),
            TraceConfig::default(),
        )
        .with_source(Arc::new(source))
    }

    #[tokio::test]
    async fn test_monitor_address_updates_profile() {
        let source = InMemoryChainSource::new([Blockchain::UsdtTrc20]).with_transactions(
            "TGarantex",
            vec![
                raw("1", "TGarantex", "TBuyer", 1_500_000),
                raw("2", "TSeller", "TGarantex", 20_000),
            ],
        );
        let monitor = monitor(source);

        let txs = monitor
            .monitor_address("TGarantex", Blockchain::UsdtTrc20)
            .await
            .unwrap();
        assert_eq!(txs.len(), 2);

        let profile = monitor.profiles().get("TGarantex").unwrap();
        assert_eq!(profile.tx_count, 2);
        assert_eq!(profile.total_volume_usd, Decimal::from(1_520_000));
        assert_eq!(profile.risk_score().score(), 30);
        assert_eq!(monitor.high_risk_addresses(Some(30)).len(), 1);
        assert!(monitor.high_risk_addresses(Some(31)).is_empty());
        assert_eq!(monitor.assess("TGarantex").unwrap().risk_factors.len(), 1);
    }

    #[tokio::test]
    async fn test_high_risk_addresses_defaults_to_configured_threshold() {
        let source = InMemoryChainSource::new([Blockchain::UsdtTrc20]).with_transactions(
            "TGarantex",
            vec![raw("1", "TGarantex", "TBuyer", 1_500_000)],
        );

        // Scores 30: below the stock threshold of 50
        let monitor = monitor(source);
        monitor
            .monitor_address("TGarantex", Blockchain::UsdtTrc20)
            .await
            .unwrap();
        assert!(monitor.high_risk_addresses(None).is_empty());

        let monitor = monitor.with_high_risk_threshold(30);
        assert_eq!(monitor.high_risk_addresses(None).len(), 1);
        assert!(monitor.high_risk_addresses(Some(31)).is_empty());
    }

    #[tokio::test]
    async fn test_caller_errors_rejected_before_fetch() {
        let source = Arc::new(InMemoryChainSource::new([Blockchain::Ethereum]));
        let monitor = ChainMonitor::new(
            Arc::new(EvasionClassifier::default()),
            Arc::new(ProfileStore::new()),
            TraceConfig::default(),
        )
        .with_source(source.clone());

        assert!(matches!(
            monitor.monitor_address("  ", Blockchain::Ethereum).await,
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            monitor.monitor_address("0xabc", Blockchain::A7a5).await,
            Err(Error::NoDataSource(_))
        ));
        assert!(matches!(
            monitor.trace_network("0xabc", Blockchain::Bitcoin, None).await,
            Err(Error::NoDataSource(_))
        ));
        assert!(source.calls().is_empty());
        assert!(monitor.profiles().is_empty());
    }

    #[tokio::test]
    async fn test_monitor_all_degrades_per_address() {
        let source = InMemoryChainSource::new([Blockchain::UsdtTrc20])
            .with_transactions("TOk", vec![raw("1", "TOk", "TX", 10)])
            .with_failure("TDown");
        let monitor = monitor(source);

        let results = monitor
            .monitor_all(&[
                WatchedAddress { address: "TDown".into(), blockchain: Blockchain::UsdtTrc20 },
                WatchedAddress { address: "TOk".into(), blockchain: Blockchain::UsdtTrc20 },
            ])
            .await;

        assert_eq!(results["TOk"].len(), 1);
        assert!(results["TDown"].is_empty());
        assert!(monitor.profiles().get("TDown").is_none());
    }

    #[tokio::test]
    async fn test_trace_network_uses_default_hops() {
        let mixer = DEFAULT_MIXER_CONTRACTS[0];
        let source = InMemoryChainSource::new([Blockchain::Ethereum]).with_transactions(
            "0xseed",
            vec![RawTransaction {
                blockchain: Blockchain::Ethereum,
                ..raw("m", "0xseed", mixer, 50)
            }],
        );
        let monitor = monitor(source);

        let network = monitor
            .trace_network("0xseed", Blockchain::Ethereum, None)
            .await
            .unwrap();

        assert_eq!(network.max_hops, 3);
        assert_eq!(network.nodes.len(), 2);
        assert_eq!(network.high_risk, vec!["m".to_string()]);
    }
}
