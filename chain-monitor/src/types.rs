//! Core types for the chain monitor

use crate::classifier::EvasionClassifier;
use crate::scoring::RiskScorer;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported chains and token networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blockchain {
    /// Bitcoin
    Bitcoin,
    /// Ethereum (native ETH)
    Ethereum,
    /// Tron (native TRX)
    Tron,
    /// USDT on Ethereum
    UsdtErc20,
    /// USDT on Tron
    UsdtTrc20,
    /// A7A5 rouble-pegged stablecoin
    A7a5,
}

impl Blockchain {
    /// All known chains
    pub const ALL: [Blockchain; 6] = [
        Blockchain::Bitcoin,
        Blockchain::Ethereum,
        Blockchain::Tron,
        Blockchain::UsdtErc20,
        Blockchain::UsdtTrc20,
        Blockchain::A7a5,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin => "bitcoin",
            Blockchain::Ethereum => "ethereum",
            Blockchain::Tron => "tron",
            Blockchain::UsdtErc20 => "usdt_erc20",
            Blockchain::UsdtTrc20 => "usdt_trc20",
            Blockchain::A7a5 => "a7a5",
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Blockchain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Blockchain::ALL
            .into_iter()
            .find(|chain| chain.as_str() == wanted)
            .ok_or_else(|| Error::UnsupportedBlockchain(s.to_string()))
    }
}

/// How a transaction likely obscures the origin or destination of funds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvasionPattern {
    /// Plain transfer to or from the address
    Direct,
    /// Contract-mediated routing through intermediaries
    Layering,
    /// Mixer or tumbler usage
    Mixing,
    /// Peer-to-peer exchange
    #[serde(rename = "p2p")]
    PeerToPeer,
    /// Nested exchange or service
    Nested,
    /// Cross-chain transfer
    ChainHopping,
}

impl EvasionPattern {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            EvasionPattern::Direct => "direct",
            EvasionPattern::Layering => "layering",
            EvasionPattern::Mixing => "mixing",
            EvasionPattern::PeerToPeer => "p2p",
            EvasionPattern::Nested => "nested",
            EvasionPattern::ChainHopping => "chain_hopping",
        }
    }

    /// Mixing and layering are the patterns reported as high risk
    pub fn is_high_risk(&self) -> bool {
        matches!(self, EvasionPattern::Mixing | EvasionPattern::Layering)
    }
}

impl fmt::Display for EvasionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score, clamped to 100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Build from an unbounded accumulator, saturating at 100
    pub fn saturating(points: u32) -> Self {
        Self(points.min(100) as u8)
    }

    /// Get raw score
    pub fn score(&self) -> u8 {
        self.0
    }

    /// Check if high risk (>= 75)
    pub fn is_high_risk(&self) -> bool {
        self.0 >= 75
    }

    /// Check if medium risk (50-74)
    pub fn is_medium_risk(&self) -> bool {
        (50..75).contains(&self.0)
    }

    /// Check if low risk (< 50)
    pub fn is_low_risk(&self) -> bool {
        self.0 < 50
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl From<RiskScore> for RiskLevel {
    fn from(score: RiskScore) -> Self {
        if score.is_high_risk() {
            RiskLevel::High
        } else if score.is_medium_risk() {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Transaction as returned by a chain data source, before analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction hash
    pub tx_hash: String,

    /// Chain the transfer happened on
    pub blockchain: Blockchain,

    /// Sender
    pub from_address: String,

    /// Recipient
    pub to_address: String,

    /// Value in chain-native units
    pub value: Decimal,

    /// USD value, when the source can tell
    pub value_usd: Option<Decimal>,

    /// Block height (0 if unknown)
    pub block_number: u64,

    /// Block time; some sources omit it
    pub block_timestamp: Option<DateTime<Utc>>,

    /// Call payload, hex encoded
    pub input: Option<String>,
}

impl RawTransaction {
    /// The address on the other side of the transfer relative to `address`.
    pub fn counterparty_of(&self, address: &str) -> &str {
        counterparty(&self.from_address, &self.to_address, address)
    }
}

/// Annotated, immutable transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash
    pub tx_hash: String,

    /// Chain the transfer happened on
    pub blockchain: Blockchain,

    /// Sender
    pub from_address: String,

    /// Recipient
    pub to_address: String,

    /// Value in chain-native units
    pub value: Decimal,

    /// USD value, when known
    pub value_usd: Option<Decimal>,

    /// Block height (0 if unknown)
    pub block_number: u64,

    /// Block time
    pub block_timestamp: Option<DateTime<Utc>>,

    /// Evasion pattern assigned by the classifier
    pub evasion_pattern: EvasionPattern,

    /// Per-transaction risk score
    pub risk_score: RiskScore,
}

impl Transaction {
    /// Classify and score a raw transaction.
    pub fn annotate(raw: RawTransaction, classifier: &EvasionClassifier) -> Self {
        let evasion_pattern = classifier.classify(&raw.to_address, raw.input.as_deref());
        let risk_score = RiskScorer::transaction_score(raw.value, evasion_pattern);

        Self {
            tx_hash: raw.tx_hash,
            blockchain: raw.blockchain,
            from_address: raw.from_address,
            to_address: raw.to_address,
            value: raw.value,
            value_usd: raw.value_usd,
            block_number: raw.block_number,
            block_timestamp: raw.block_timestamp,
            evasion_pattern,
            risk_score,
        }
    }

    /// The address on the other side of the transfer relative to `address`.
    pub fn counterparty_of(&self, address: &str) -> &str {
        counterparty(&self.from_address, &self.to_address, address)
    }
}

// Sender matches (case-insensitive) -> recipient, otherwise the sender.
fn counterparty<'a>(from: &'a str, to: &'a str, address: &str) -> &'a str {
    if from.eq_ignore_ascii_case(address) {
        to
    } else {
        from
    }
}
