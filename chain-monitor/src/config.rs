//! Configuration for the chain monitor

use crate::classifier::{DEFAULT_MIXER_CONTRACTS, DEFAULT_PAYLOAD_THRESHOLD};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Chain monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Etherscan API base URL
    pub etherscan_base_url: String,

    /// Etherscan API key
    pub etherscan_api_key: Option<String>,

    /// TronGrid API base URL
    pub trongrid_base_url: String,

    /// TronGrid API key
    pub trongrid_api_key: Option<String>,

    /// Explorer request timeout (seconds)
    pub request_timeout_secs: u64,

    /// TRC-20 transfers requested per call
    pub trongrid_page_limit: u32,

    /// Known mixer contracts
    pub mixer_contracts: Vec<String>,

    /// Payload length above which a call counts as layering
    pub payload_length_threshold: usize,

    /// Default threshold for high-risk profile queries
    pub high_risk_threshold: u8,

    /// Network tracing
    pub trace: TraceConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            etherscan_base_url: "https://api.etherscan.io/api".to_string(),
            etherscan_api_key: None,
            trongrid_base_url: "https://api.trongrid.io".to_string(),
            trongrid_api_key: None,
            request_timeout_secs: 30,
            trongrid_page_limit: 100,
            mixer_contracts: DEFAULT_MIXER_CONTRACTS.iter().map(|s| s.to_string()).collect(),
            payload_length_threshold: DEFAULT_PAYLOAD_THRESHOLD,
            high_risk_threshold: 50,
            trace: TraceConfig::default(),
        }
    }
}

/// Evasion network tracing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Most recent transactions fetched per address (bounds explorer fan-out)
    pub max_transactions_per_address: usize,

    /// Only edges scoring strictly above this are expanded
    pub expansion_score_threshold: u8,

    /// Hop ceiling when the caller does not give one
    pub default_max_hops: u32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_transactions_per_address: 20,
            expansion_score_threshold: 50,
            default_max_hops: 3,
        }
    }
}

impl MonitorConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("Failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = MonitorConfig::default();

        if let Ok(url) = std::env::var("ETHERSCAN_BASE_URL") {
            config.etherscan_base_url = url;
        }
        if let Ok(key) = std::env::var("ETHERSCAN_API_KEY") {
            config.etherscan_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("TRONGRID_BASE_URL") {
            config.trongrid_base_url = url;
        }
        if let Ok(key) = std::env::var("TRONGRID_API_KEY") {
            config.trongrid_api_key = Some(key);
        }
        if let Some(secs) = parse_env("MONITOR_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout_secs = secs;
        }
        if let Some(hops) = parse_env("TRACE_MAX_HOPS")? {
            config.trace.default_max_hops = hops;
        }
        if let Ok(mixers) = std::env::var("MIXER_CONTRACTS") {
            config.mixer_contracts = mixers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Explorer request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.trace.max_transactions_per_address, 20);
        assert_eq!(config.trace.expansion_score_threshold, 50);
        assert_eq!(config.payload_length_threshold, 200);
        assert_eq!(config.mixer_contracts.len(), 2);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            etherscan_api_key = "KEY"

            [trace]
            default_max_hops = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.etherscan_api_key.as_deref(), Some("KEY"));
        assert_eq!(config.trace.default_max_hops, 5);
        assert_eq!(config.trace.max_transactions_per_address, 20);
        assert_eq!(config.trongrid_base_url, "https://api.trongrid.io");
    }
}
