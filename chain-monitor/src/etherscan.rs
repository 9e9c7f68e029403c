//! Etherscan `txlist` client for Ethereum addresses

use crate::source::ChainDataSource;
use crate::{Blockchain, Error, RawTransaction, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "etherscan";
const WEI_SCALE: u32 = 18;
const NO_TRANSACTIONS: &str = "No transactions found";

/// Ethereum data source backed by the Etherscan account API
pub struct EtherscanClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    // Array of transactions on success, an error string otherwise
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtherscanTx {
    hash: String,
    from: String,
    #[serde(default)]
    to: String,
    value: String,
    block_number: String,
    time_stamp: String,
    #[serde(default)]
    input: Option<String>,
}

impl EtherscanClient {
    /// Create client with a per-request timeout
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Parse a `txlist` response body
    pub fn parse_txlist(body: &str) -> Result<Vec<RawTransaction>> {
        let response: EtherscanResponse = serde_json::from_str(body)
            .map_err(|e| Error::provider(PROVIDER, format!("Malformed response: {}", e)))?;

        if response.status != "1" {
            if response.message.starts_with(NO_TRANSACTIONS) {
                return Ok(Vec::new());
            }
            return Err(Error::provider(
                PROVIDER,
                format!("{}: {}", response.message, response.result),
            ));
        }

        let txs: Vec<EtherscanTx> = serde_json::from_value(response.result)
            .map_err(|e| Error::provider(PROVIDER, format!("Malformed result: {}", e)))?;

        Ok(txs.into_iter().filter_map(convert).collect())
    }
}

fn convert(tx: EtherscanTx) -> Option<RawTransaction> {
    let value = tx
        .value
        .parse::<i128>()
        .ok()
        .and_then(|wei| Decimal::try_from_i128_with_scale(wei, WEI_SCALE).ok());
    let Some(value) = value else {
        warn!(tx_hash = %tx.hash, value = %tx.value, "Skipping transaction with unrepresentable value");
        return None;
    };
    let value = value.normalize();

    let block_number = tx.block_number.parse().unwrap_or(0);
    let block_timestamp = tx
        .time_stamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    Some(RawTransaction {
        tx_hash: tx.hash,
        blockchain: Blockchain::Ethereum,
        from_address: tx.from,
        to_address: tx.to,
        value,
        value_usd: None,
        block_number,
        block_timestamp,
        input: tx.input,
    })
}

#[async_trait]
impl ChainDataSource for EtherscanClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports(&self, blockchain: Blockchain) -> bool {
        matches!(blockchain, Blockchain::Ethereum | Blockchain::UsdtErc20)
    }

    async fn fetch_transactions(
        &self,
        address: &str,
        blockchain: Blockchain,
    ) -> Result<Vec<RawTransaction>> {
        debug!(address = %address, %blockchain, "Fetching Etherscan txlist");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "desc"),
                ("apikey", self.api_key.as_deref().unwrap_or("")),
            ])
            .send()
            .await
            .map_err(|e| Error::from_http(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(Error::provider(
                PROVIDER,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_http(PROVIDER, e))?;
        let transactions = Self::parse_txlist(&body)?;

        info!(address = %address, count = transactions.len(), "Fetched Etherscan transactions");
        Ok(transactions)
    }
}
