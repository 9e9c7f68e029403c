//! Sanctions feed configuration

use crate::error::{ComplianceError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// OFAC SDN list (XML)
    pub ofac_sdn_url: String,

    /// EU consolidated financial sanctions list (XML)
    pub eu_sanctions_url: String,

    /// UK consolidated list (CSV)
    pub uk_sanctions_url: String,

    /// Download timeout (seconds)
    pub request_timeout_secs: u64,

    /// How often lists are refreshed by long-running callers (hours)
    pub update_interval_hours: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ofac_sdn_url: "https://www.treasury.gov/ofac/downloads/sdn.xml".to_string(),
            eu_sanctions_url:
                "https://webgate.ec.europa.eu/fsd/fsf/public/files/xmlFullSanctionsList_1_1/content"
                    .to_string(),
            uk_sanctions_url:
                "https://ofsistorage.blob.core.windows.net/publishlive/2022format/ConList.csv"
                    .to_string(),
            request_timeout_secs: 120,
            update_interval_hours: 12,
        }
    }
}

impl FeedConfig {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ComplianceError::ConfigError(format!("Failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| ComplianceError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Result<Self> {
        let mut config = FeedConfig::default();

        if let Ok(url) = std::env::var("OFAC_SDN_URL") {
            config.ofac_sdn_url = url;
        }
        if let Ok(url) = std::env::var("EU_SANCTIONS_URL") {
            config.eu_sanctions_url = url;
        }
        if let Ok(url) = std::env::var("UK_SANCTIONS_URL") {
            config.uk_sanctions_url = url;
        }
        if let Ok(raw) = std::env::var("SANCTIONS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ComplianceError::ConfigError(format!(
                    "SANCTIONS_REQUEST_TIMEOUT_SECS has invalid value '{}'",
                    raw
                ))
            })?;
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_hours * 3600)
    }

    /// HTTP client shared by all feeds
    pub fn client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.request_timeout())
            .build()
            .map_err(|e| ComplianceError::ConfigError(format!("Failed to create HTTP client: {}", e)))
    }
}
