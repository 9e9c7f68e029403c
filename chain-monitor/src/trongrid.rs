//! TronGrid TRC-20 transfer client
//!
//! USDT on Tron is the main rail for rouble-linked flows, so this source
//! reads TRC-20 transfers rather than native TRX transactions.

use crate::source::ChainDataSource;
use crate::{Blockchain, Error, RawTransaction, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "trongrid";
const DEFAULT_DECIMALS: u32 = 6;

/// USDT TRC-20 contract
pub const USDT_CONTRACT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

/// Tron data source backed by the TronGrid v1 API
pub struct TronGridClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    page_limit: u32,
}

#[derive(Debug, Deserialize)]
struct TronGridResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Vec<Trc20Transfer>,
}

#[derive(Debug, Deserialize)]
struct Trc20Transfer {
    transaction_id: String,
    #[serde(default)]
    token_info: TokenInfo,
    #[serde(default)]
    block_timestamp: Option<i64>,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    decimals: Option<u32>,
}

impl TronGridClient {
    /// Create client with a per-request timeout and page size
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        page_limit: u32,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            page_limit,
        })
    }

    /// Parse a `transactions/trc20` response body
    pub fn parse_transfers(body: &str) -> Result<Vec<RawTransaction>> {
        let response: TronGridResponse = serde_json::from_str(body)
            .map_err(|e| Error::provider(PROVIDER, format!("Malformed response: {}", e)))?;

        if !response.success {
            return Err(Error::provider(
                PROVIDER,
                response.error.unwrap_or_else(|| "request not successful".to_string()),
            ));
        }

        // Spam tokens with unrepresentable amounts are skipped, not fatal
        Ok(response.data.into_iter().filter_map(convert).collect())
    }
}

fn token_value(value: &str, decimals: u32) -> Option<Decimal> {
    let units: i128 = value.parse().ok()?;
    Decimal::try_from_i128_with_scale(units, decimals)
        .ok()
        .map(|v| v.normalize())
}

fn convert(transfer: Trc20Transfer) -> Option<RawTransaction> {
    let decimals = transfer.token_info.decimals.unwrap_or(DEFAULT_DECIMALS);
    let Some(value) = token_value(&transfer.value, decimals) else {
        warn!(
            tx_hash = %transfer.transaction_id,
            token = %transfer.token_info.symbol,
            value = %transfer.value,
            decimals,
            "Skipping transfer with unrepresentable value"
        );
        return None;
    };

    let is_usdt = transfer.token_info.symbol.eq_ignore_ascii_case("USDT")
        || transfer.token_info.address == USDT_CONTRACT;

    Some(RawTransaction {
        tx_hash: transfer.transaction_id,
        blockchain: Blockchain::UsdtTrc20,
        from_address: transfer.from,
        to_address: transfer.to,
        value,
        // Stablecoin: one token is one dollar
        value_usd: is_usdt.then_some(value),
        block_number: 0,
        block_timestamp: transfer
            .block_timestamp
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        input: None,
    })
}

#[async_trait]
impl ChainDataSource for TronGridClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports(&self, blockchain: Blockchain) -> bool {
        matches!(blockchain, Blockchain::Tron | Blockchain::UsdtTrc20)
    }

    async fn fetch_transactions(
        &self,
        address: &str,
        blockchain: Blockchain,
    ) -> Result<Vec<RawTransaction>> {
        debug!(address = %address, %blockchain, "Fetching TRC-20 transfers");

        let url = format!("{}/v1/accounts/{}/transactions/trc20", self.base_url, address);
        let limit = self.page_limit.to_string();
        let mut request = self
            .http_client
            .get(&url)
            .query(&[("limit", limit.as_str()), ("only_confirmed", "true")]);

        if let Some(key) = &self.api_key {
            request = request.header("TRON-PRO-API-KEY", key);
        }

        let response = request
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
        let transactions = Self::parse_transfers(&body)?;

        info!(address = %address, count = transactions.len(), "Fetched TRC-20 transfers");
        Ok(transactions)
    }
}
