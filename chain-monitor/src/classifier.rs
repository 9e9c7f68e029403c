//! Evasion pattern classification
//!
//! Rules are applied in order, first match wins:
//!
//! 1. Recipient is a known mixer contract -> [`EvasionPattern::Mixing`]
//! 2. Call payload longer than the threshold -> [`EvasionPattern::Layering`]
//! 3. Anything else -> [`EvasionPattern::Direct`]
//!
//! Payload length stands in for contract-mediated routing (swaps,
//! multi-hop calls). ABI decoding is not attempted.

use crate::types::EvasionPattern;
use std::collections::HashSet;

/// Tornado Cash router and 0.1 ETH pool
pub const DEFAULT_MIXER_CONTRACTS: [&str; 2] = [
    "0xd90e2f925da726b50c4ed8d0fb90ad053324f31b",
    "0x722122df12d4e14e13ac3b6895a86e84145b6967",
];

/// Payload length (encoded characters) above which a call counts as layering
pub const DEFAULT_PAYLOAD_THRESHOLD: usize = 200;

/// Tags transactions with an evasion pattern from static rule tables
#[derive(Debug, Clone)]
pub struct EvasionClassifier {
    // lowercase
    mixer_contracts: HashSet<String>,
    payload_threshold: usize,
}

impl EvasionClassifier {
    /// Create classifier from a mixer table and payload threshold
    pub fn new<I, S>(mixer_contracts: I, payload_threshold: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mixer_contracts: mixer_contracts
                .into_iter()
                .map(|addr| addr.as_ref().trim().to_lowercase())
                .collect(),
            payload_threshold,
        }
    }

    /// Classify a transaction by its recipient and call payload. Never fails.
    pub fn classify(&self, to_address: &str, input: Option<&str>) -> EvasionPattern {
        if self.is_mixer(to_address) {
            return EvasionPattern::Mixing;
        }

        if let Some(payload) = input.filter(|p| has_payload(p)) {
            if payload.len() > self.payload_threshold {
                return EvasionPattern::Layering;
            }
        }

        EvasionPattern::Direct
    }

    /// Check an address against the mixer table
    pub fn is_mixer(&self, address: &str) -> bool {
        self.mixer_contracts.contains(&address.trim().to_lowercase())
    }

    /// Number of known mixer contracts
    pub fn mixer_count(&self) -> usize {
        self.mixer_contracts.len()
    }
}

impl Default for EvasionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MIXER_CONTRACTS, DEFAULT_PAYLOAD_THRESHOLD)
    }
}

// Explorers report a plain value transfer as "0x".
fn has_payload(input: &str) -> bool {
    !input.is_empty() && input != "0x"
}
