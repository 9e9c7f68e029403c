//! Property-based tests for the evasion network tracer
//!
//! Random directed transaction graphs (cycles and self-loops included):
//! - Termination for every graph and hop ceiling
//! - Every node's hop is within the ceiling
//! - No address appears twice
//! - Each address is fetched at most once

use chain_monitor::{
    Blockchain, EvasionClassifier, EvasionTracer, InMemoryChainSource, RawTransaction,
    TraceConfig,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// (from, to, expandable) triples over `n` addresses
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, bool)>)> {
    (2usize..12).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, any::<bool>()), 0..60),
        )
    })
}

fn address(i: usize) -> String {
    format!("0x{:040x}", i)
}

fn transaction(index: usize, from: usize, to: usize, expandable: bool) -> RawTransaction {
    // Expandable edges: long payload (layering, 30) + value above 100 (30) = 60
    let (value, input) = if expandable {
        (Decimal::from(500), Some(format!("0x{}", "00".repeat(150))))
    } else {
        (Decimal::new(5, 1), None)
    };

    RawTransaction {
        tx_hash: format!("0xtx{}", index),
        blockchain: Blockchain::Ethereum,
        from_address: address(from),
        to_address: address(to),
        value,
        value_usd: None,
        block_number: index as u64,
        block_timestamp: None,
        input,
    }
}

fn build_source(edges: &[(usize, usize, bool)]) -> InMemoryChainSource {
    let mut per_address: HashMap<usize, Vec<RawTransaction>> = HashMap::new();
    for (index, &(from, to, expandable)) in edges.iter().enumerate() {
        let tx = transaction(index, from, to, expandable);
        per_address.entry(from).or_default().push(tx.clone());
        if to != from {
            per_address.entry(to).or_default().push(tx);
        }
    }

    per_address
        .into_iter()
        .fold(InMemoryChainSource::new([Blockchain::Ethereum]), |source, (i, txs)| {
            source.with_transactions(&address(i), txs)
        })
}

proptest! {
    #[test]
    fn prop_trace_terminates_within_bounds(
        (n, edges) in graph_strategy(),
        max_hops in 0u32..6,
    ) {
        let source = Arc::new(build_source(&edges));
        let tracer = EvasionTracer::new(
            source.clone(),
            Arc::new(EvasionClassifier::default()),
            TraceConfig::default(),
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let network = runtime
            .block_on(tracer.trace(&address(0), Blockchain::Ethereum, max_hops))
            .unwrap();

        // Seed first, at hop 0
        prop_assert_eq!(&network.nodes[0].address, &address(0));
        prop_assert_eq!(network.nodes[0].hop, 0);

        // Hop ceiling
        for node in &network.nodes {
            prop_assert!(node.hop <= max_hops);
        }

        // Node uniqueness
        let distinct: HashSet<_> = network.nodes.iter().map(|n| n.address.clone()).collect();
        prop_assert_eq!(distinct.len(), network.nodes.len());
        prop_assert!(network.nodes.len() <= n);

        // One fetch per visited node
        prop_assert_eq!(source.calls().len(), network.nodes.len());

        // Every high-risk hash belongs to a recorded edge
        let edge_hashes: HashSet<_> = network.edges.iter().map(|e| e.tx_hash.clone()).collect();
        for hash in &network.high_risk {
            prop_assert!(edge_hashes.contains(hash));
        }
    }
}
