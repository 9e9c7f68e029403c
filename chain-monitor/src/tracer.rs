//! Evasion network tracing
//!
//! Bounded depth-first walk outward from a seed address. Each visited
//! address has its most recent transactions fetched; every transaction
//! becomes an edge, and only edges scoring above the expansion threshold
//! are followed further.
//!
//! Termination: an address is expanded only if `hop <= max_hops` and it has
//! not been visited yet. Both checks happen before the fetch, and the walk
//! uses an explicit frame stack instead of recursion, so cyclic graphs and
//! large `max_hops` values cannot grow the call stack.
//!
//! Hop labels are first-visit distances along the DFS order (transactions
//! in the order the source returns them), not shortest distances. An
//! address first reached through a long branch keeps that longer hop even
//! if a shorter path is discovered later.

use crate::config::TraceConfig;
use crate::source::ChainDataSource;
use crate::{Blockchain, Error, EvasionClassifier, EvasionPattern, Result, Transaction};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Address reached by a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Address
    pub address: String,
    /// Hop distance at first visit
    pub hop: u32,
}

/// Observed transaction, oriented away from the address being expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    /// Address being expanded
    pub from: String,
    /// Counterparty
    pub to: String,
    /// Transaction hash
    pub tx_hash: String,
    /// Native value
    pub value: Decimal,
    /// Evasion tag
    pub evasion_pattern: EvasionPattern,
}

/// Risk-scored subgraph produced by one trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvasionNetwork {
    /// Trace ID
    pub trace_id: Uuid,
    /// Seed address
    pub seed: String,
    /// Chain traced
    pub blockchain: Blockchain,
    /// Requested hop ceiling
    pub max_hops: u32,
    /// Visited addresses, each exactly once
    pub nodes: Vec<NetworkNode>,
    /// Every transaction observed along the trace
    pub edges: Vec<NetworkEdge>,
    /// Hashes of mixing and layering transactions
    pub high_risk: Vec<String>,
    /// Visited addresses whose fetch failed; treated as leaves
    pub unreachable: Vec<String>,
    /// Trace timestamp
    pub traced_at: DateTime<Utc>,
}

impl EvasionNetwork {
    fn new(seed: &str, blockchain: Blockchain, max_hops: u32) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            seed: seed.to_string(),
            blockchain,
            max_hops,
            nodes: Vec::new(),
            edges: Vec::new(),
            high_risk: Vec::new(),
            unreachable: Vec::new(),
            traced_at: Utc::now(),
        }
    }

    /// Look up a node by address
    pub fn node(&self, address: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|node| node.address == address)
    }

    /// Deepest hop reached
    pub fn max_hop(&self) -> u32 {
        self.nodes.iter().map(|node| node.hop).max().unwrap_or(0)
    }

    /// Node count per hop distance, up to the deepest hop reached
    pub fn hop_counts(&self) -> Vec<(u32, usize)> {
        (0..=self.max_hop())
            .map(|hop| (hop, self.nodes.iter().filter(|node| node.hop == hop).count()))
            .collect()
    }
}

// One address being expanded; the iterator is the resume point.
struct Frame {
    address: String,
    hop: u32,
    transactions: std::vec::IntoIter<Transaction>,
}

/// Walks transaction graphs from a seed address
pub struct EvasionTracer {
    source: Arc<dyn ChainDataSource>,
    classifier: Arc<EvasionClassifier>,
    config: TraceConfig,
}

impl EvasionTracer {
    /// Create tracer over a data source
    pub fn new(
        source: Arc<dyn ChainDataSource>,
        classifier: Arc<EvasionClassifier>,
        config: TraceConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            config,
        }
    }

    /// Trace the evasion network around `seed`.
    ///
    /// Fails only when the source cannot serve `blockchain`, and then
    /// before any fetch is issued. Fetch failures during the walk turn the
    /// affected address into a leaf; everything gathered up to that point
    /// is kept.
    pub async fn trace(
        &self,
        seed: &str,
        blockchain: Blockchain,
        max_hops: u32,
    ) -> Result<EvasionNetwork> {
        if !self.source.supports(blockchain) {
            return Err(Error::NoDataSource(blockchain.to_string()));
        }

        let mut network = EvasionNetwork::new(seed, blockchain, max_hops);
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();

        if let Some(frame) = self
            .visit(seed, 0, &mut visited, &mut network)
            .await
        {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(tx) = frame.transactions.next() else {
                stack.pop();
                continue;
            };
            let hop = frame.hop;
            let address = frame.address.clone();
            let counterparty = tx.counterparty_of(&address).to_string();

            if tx.evasion_pattern.is_high_risk() {
                network.high_risk.push(tx.tx_hash.clone());
            }
            network.edges.push(NetworkEdge {
                from: address,
                to: counterparty.clone(),
                tx_hash: tx.tx_hash,
                value: tx.value,
                evasion_pattern: tx.evasion_pattern,
            });

            if tx.risk_score.score() > self.config.expansion_score_threshold {
                if let Some(child) = self
                    .visit(&counterparty, hop + 1, &mut visited, &mut network)
                    .await
                {
                    stack.push(child);
                }
            }
        }

        info!(
            seed = %seed,
            %blockchain,
            nodes = network.nodes.len(),
            edges = network.edges.len(),
            high_risk = network.high_risk.len(),
            "Evasion network traced"
        );

        Ok(network)
    }

    // Record the node and fetch its transactions. `None` when the address
    // is past the hop ceiling or already visited.
    async fn visit(
        &self,
        address: &str,
        hop: u32,
        visited: &mut HashSet<String>,
        network: &mut EvasionNetwork,
    ) -> Option<Frame> {
        if hop > network.max_hops || visited.contains(address) {
            return None;
        }

        visited.insert(address.to_string());
        network.nodes.push(NetworkNode {
            address: address.to_string(),
            hop,
        });

        let transactions = match self
            .source
            .fetch_transactions(address, network.blockchain)
            .await
        {
            Ok(raw) => raw
                .into_iter()
                .take(self.config.max_transactions_per_address)
                .map(|tx| Transaction::annotate(tx, &self.classifier))
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!(address = %address, hop, error = %e, "Fetch failed, treating address as leaf");
                network.unreachable.push(address.to_string());
                Vec::new()
            }
        };

        debug!(address = %address, hop, transactions = transactions.len(), "Expanding address");

        Some(Frame {
            address: address.to_string(),
            hop,
            transactions: transactions.into_iter(),
        })
    }
}
