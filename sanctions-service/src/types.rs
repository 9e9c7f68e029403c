use chain_monitor::Blockchain;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanctionsSource {
    Ofac, // US Office of Foreign Assets Control
    Eu,   // European Union
    Uk,   // UK Office of Financial Sanctions Implementation
}

impl SanctionsSource {
    pub const ALL: [SanctionsSource; 3] = [SanctionsSource::Ofac, SanctionsSource::Eu, SanctionsSource::Uk];

    pub fn as_str(&self) -> &'static str {
        match self {
            SanctionsSource::Ofac => "ofac",
            SanctionsSource::Eu => "eu",
            SanctionsSource::Uk => "uk",
        }
    }
}

impl fmt::Display for SanctionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Individual,
    Company,
    Exchange,
}

impl EntityType {
    /// Map a feed's free-text subject type. Anything that is not clearly a
    /// person or an exchange is treated as a company.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "individual" | "person" | "p" => EntityType::Individual,
            "exchange" => EntityType::Exchange,
            _ => EntityType::Company,
        }
    }
}

/// Designated digital currency address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoAddress {
    pub address: String,
    /// `None` when the feed names a currency we do not track
    pub blockchain: Option<Blockchain>,
    /// Ticker as written by the feed (XBT, ETH, ...)
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionedEntity {
    pub name: String,
    pub entity_type: EntityType,
    pub sources: BTreeSet<SanctionsSource>,

    // Source-specific references
    pub ofac_id: Option<String>,
    pub eu_reference: Option<String>,
    pub uk_reference: Option<String>,

    pub aliases: Vec<String>,
    pub country: String,
    pub programs: Vec<String>,
    pub crypto_addresses: Vec<CryptoAddress>,

    // Exchange classification
    pub is_exchange: bool,
    pub exchange_name: Option<String>,
    pub estimated_volume_usd: Option<Decimal>,

    pub designation_date: Option<NaiveDate>,
    pub remarks: String,
}

impl SanctionedEntity {
    /// Record as emitted by a single feed
    pub fn new(name: impl Into<String>, entity_type: EntityType, source: SanctionsSource) -> Self {
        Self {
            name: name.into(),
            entity_type,
            sources: BTreeSet::from([source]),
            ofac_id: None,
            eu_reference: None,
            uk_reference: None,
            aliases: Vec::new(),
            country: "Russia".to_string(),
            programs: Vec::new(),
            crypto_addresses: Vec::new(),
            is_exchange: false,
            exchange_name: None,
            estimated_volume_usd: None,
            designation_date: None,
            remarks: String::new(),
        }
    }

    pub fn reference(&self, source: SanctionsSource) -> Option<&str> {
        match source {
            SanctionsSource::Ofac => self.ofac_id.as_deref(),
            SanctionsSource::Eu => self.eu_reference.as_deref(),
            SanctionsSource::Uk => self.uk_reference.as_deref(),
        }
    }

    pub fn reference_mut(&mut self, source: SanctionsSource) -> &mut Option<String> {
        match source {
            SanctionsSource::Ofac => &mut self.ofac_id,
            SanctionsSource::Eu => &mut self.eu_reference,
            SanctionsSource::Uk => &mut self.uk_reference,
        }
    }

    pub fn designated_by(&self, source: SanctionsSource) -> bool {
        self.sources.contains(&source)
    }
}
