//! Per-address risk profiles
//!
//! [`ProfileStore`] is the single source of truth for address-level risk.
//! It is constructed once per monitoring session and shared by reference
//! (`Arc<ProfileStore>`); nothing reaches it through static lookup.
//!
//! Locking: each address lives in one `DashMap` entry. `observe` folds a
//! whole batch while holding that entry's write guard, so two concurrent
//! observations of the same address are serialized and neither update is
//! lost. Reads clone a snapshot under the shard read lock.

use crate::scoring::{ProfileAssessment, RiskScorer};
use crate::{Blockchain, EvasionPattern, RiskScore, Transaction};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Running aggregate of activity seen for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRiskProfile {
    /// Profiled address
    pub address: String,

    /// Chain of the address
    pub blockchain: Blockchain,

    /// Sum of known USD values
    pub total_volume_usd: Decimal,

    /// Transactions observed
    pub tx_count: u64,

    /// Earliest block time observed
    pub first_seen: Option<DateTime<Utc>>,

    /// Latest block time observed
    pub last_seen: Option<DateTime<Utc>>,

    /// Transfers tagged with neither layering nor mixing
    pub direct_transfers: u64,

    /// Layering events
    pub layering_events: u64,

    /// Mixing events
    pub mixing_events: u64,

    /// Distinct addresses seen on the other side
    pub counterparties: BTreeSet<String>,
}

impl AddressRiskProfile {
    /// Create an empty profile
    pub fn new(address: impl Into<String>, blockchain: Blockchain) -> Self {
        Self {
            address: address.into(),
            blockchain,
            total_volume_usd: Decimal::ZERO,
            tx_count: 0,
            first_seen: None,
            last_seen: None,
            direct_transfers: 0,
            layering_events: 0,
            mixing_events: 0,
            counterparties: BTreeSet::new(),
        }
    }

    /// Derived from the counters on every call.
    pub fn risk_score(&self) -> RiskScore {
        RiskScorer::profile_score(self)
    }

    /// Fold one transaction into the counters
    pub fn record(&mut self, tx: &Transaction) {
        self.tx_count += 1;

        if let Some(usd) = tx.value_usd {
            self.total_volume_usd += usd;
        }

        match tx.evasion_pattern {
            EvasionPattern::Layering => self.layering_events += 1,
            EvasionPattern::Mixing => self.mixing_events += 1,
            _ => self.direct_transfers += 1,
        }

        self.counterparties
            .insert(tx.counterparty_of(&self.address).to_string());

        if let Some(ts) = tx.block_timestamp {
            if self.first_seen.map_or(true, |first| ts < first) {
                self.first_seen = Some(ts);
            }
            if self.last_seen.map_or(true, |last| ts > last) {
                self.last_seen = Some(ts);
            }
        }
    }
}

/// Process-wide address profile store
#[derive(Debug, Default)]
pub struct ProfileStore {
    // Map: address -> profile
    profiles: DashMap<String, AddressRiskProfile>,
}

impl ProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    /// Fold a batch of transactions into the profile for `address`,
    /// creating it on first use.
    pub fn observe(&self, address: &str, blockchain: Blockchain, transactions: &[Transaction]) {
        let mut entry = self
            .profiles
            .entry(address.to_string())
            .or_insert_with(|| AddressRiskProfile::new(address, blockchain));
        let profile = entry.value_mut();

        for tx in transactions {
            profile.record(tx);
        }

        debug!(
            address = %address,
            observed = transactions.len(),
            tx_count = profile.tx_count,
            "Profile updated"
        );
    }

    /// Profiles scoring at or above `threshold`, in no particular order.
    pub fn query(&self, threshold: u8) -> Vec<AddressRiskProfile> {
        self.profiles
            .iter()
            .filter(|entry| entry.value().risk_score().score() >= threshold)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of a single profile
    pub fn get(&self, address: &str) -> Option<AddressRiskProfile> {
        self.profiles.get(address).map(|entry| entry.value().clone())
    }

    /// Assess a single profile
    pub fn assess(&self, address: &str) -> Option<ProfileAssessment> {
        self.profiles
            .get(address)
            .map(|entry| RiskScorer::assess_profile(entry.value()))
    }

    /// Get total number of tracked addresses
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when nothing has been observed yet
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
