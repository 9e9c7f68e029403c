//! Sanctions tracker CLI

use anyhow::{Context, Result};
use chain_monitor::{Blockchain, ChainMonitor, MonitorConfig, ProfileStore};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sanctions_service::{AggregationReport, FeedConfig, SanctionedEntity, SanctionsAggregator, KNOWN_EXCHANGES};
use std::collections::BTreeMap;
use std::sync::Arc;

const RULE: &str = "============================================================";

#[derive(Parser)]
#[command(name = "sanctions-tracker")]
#[command(about = "Russia-linked sanctions and on-chain evasion tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and merge the OFAC, EU and UK lists
    Fetch {
        /// Also print the merged entities as JSON
        #[arg(long)]
        json: bool,
    },

    /// List sanctioned exchanges by estimated volume
    Exchanges,

    /// Summary statistics over the merged lists
    Stats,

    /// Fetch and analyse transactions of one address
    Monitor {
        /// Address to monitor
        address: String,
        /// Chain the address lives on
        #[arg(short, long, default_value = "ethereum")]
        blockchain: Blockchain,
        /// Transactions to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Trace the evasion network around a seed address
    Trace {
        /// Seed address
        address: String,
        /// Chain the address lives on
        #[arg(short, long, default_value = "ethereum")]
        blockchain: Blockchain,
        /// Hop ceiling
        #[arg(long)]
        hops: Option<u32>,
        /// Also print the network as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { json } => cmd_fetch(json).await,
        Commands::Exchanges => cmd_exchanges().await,
        Commands::Stats => cmd_stats().await,
        Commands::Monitor {
            address,
            blockchain,
            limit,
        } => cmd_monitor(&address, blockchain, limit).await,
        Commands::Trace {
            address,
            blockchain,
            hops,
            json,
        } => cmd_trace(&address, blockchain, hops, json).await,
    }
}

async fn fetch_report() -> Result<AggregationReport> {
    let config = FeedConfig::from_env()?;
    tracing::info!("Fetching sanctions from OFAC, EU, and UK sources");

    let aggregator = SanctionsAggregator::from_config(&config)?;
    let report = aggregator.fetch_all().await;

    for source in &report.failed_sources {
        tracing::warn!(%source, "Source unavailable, results are partial");
    }
    Ok(report)
}

fn monitor() -> Result<ChainMonitor> {
    let config = MonitorConfig::from_env()?;
    ChainMonitor::from_config(&config, Arc::new(ProfileStore::new()))
        .context("Failed to set up chain monitor")
}

fn format_volume(volume: Option<Decimal>) -> String {
    match volume {
        Some(v) => format!("${}B", (v / Decimal::from(1_000_000_000)).round_dp(2)),
        None => "Unknown".to_string(),
    }
}

fn format_sources(entity: &SanctionedEntity) -> String {
    entity
        .sources
        .iter()
        .map(|s| s.as_str().to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn short(address: &str) -> &str {
    address.get(..20).unwrap_or(address)
}

async fn cmd_fetch(json: bool) -> Result<()> {
    let report = fetch_report().await?;

    println!("\n{}", RULE);
    println!("Russia-Linked Sanctioned Entities");
    println!("{}", RULE);
    println!("Total entities: {}", report.entities.len());

    println!("\nBy Source:");
    for (source, count) in report.source_counts() {
        println!("  - {}: {}", source.as_str().to_uppercase(), count);
    }

    let exchanges: Vec<_> = report.exchanges().collect();
    println!("\nSanctioned Exchanges: {}", exchanges.len());
    for exchange in exchanges {
        println!(
            "  - {} ({}) - Volume: {}",
            exchange.exchange_name.as_deref().unwrap_or(&exchange.name),
            format_sources(exchange),
            format_volume(exchange.estimated_volume_usd)
        );
    }

    println!("\nTotal crypto addresses: {}", report.total_crypto_addresses());

    if json {
        println!("\n{}", serde_json::to_string_pretty(&report.entities)?);
    }
    Ok(())
}

async fn cmd_exchanges() -> Result<()> {
    let report = fetch_report().await?;

    let mut exchanges: Vec<_> = report.exchanges().collect();
    exchanges.sort_by(|a, b| b.estimated_volume_usd.cmp(&a.estimated_volume_usd));
    let total: Decimal = exchanges.iter().filter_map(|e| e.estimated_volume_usd).sum();

    println!("\n{}", RULE);
    println!("Sanctioned Russian Crypto Exchanges");
    println!("{}\n", RULE);
    println!("Total exchanges: {}", exchanges.len());
    println!("Combined estimated volume: {}\n", format_volume(Some(total)));

    for exchange in exchanges {
        println!("{}", exchange.exchange_name.as_deref().unwrap_or(&exchange.name));
        println!("   Sources: {}", format_sources(exchange));
        println!("   Volume: {}", format_volume(exchange.estimated_volume_usd));
        println!("   Addresses: {}", exchange.crypto_addresses.len());
        println!();
    }
    Ok(())
}

async fn cmd_stats() -> Result<()> {
    let report = fetch_report().await?;
    let exchanges: Vec<_> = report.exchanges().collect();
    let multi_source = report.entities.iter().filter(|e| e.sources.len() > 1).count();
    let total_volume: Decimal = exchanges.iter().filter_map(|e| e.estimated_volume_usd).sum();

    println!("\n{}", RULE);
    println!("Russia Sanctions Tracker - Statistics");
    println!("Generated: {}", chrono::Utc::now().to_rfc3339());
    println!("{}\n", RULE);

    println!("Sanctioned Entities:");
    println!("  Total: {}", report.entities.len());
    println!("\nBy Source:");
    for (source, count) in report.source_counts() {
        println!("  - {}: {}", source.as_str().to_uppercase(), count);
    }
    println!("  - Multi-source: {}", multi_source);

    println!("\nExchanges:");
    println!("  Total: {}", exchanges.len());
    println!("  Combined volume: {}", format_volume(Some(total_volume)));

    println!("\nCrypto Addresses:");
    println!("  Total designated: {}", report.total_crypto_addresses());

    println!("\nKnown Sanctioned Exchanges:");
    for known in KNOWN_EXCHANGES.iter() {
        let listed = exchanges
            .iter()
            .any(|e| e.exchange_name.as_deref() == Some(known.name));
        let status = if listed { "Listed" } else { "Not in current data" };
        println!("  - {}: {}", known.name, status);
    }
    Ok(())
}

async fn cmd_monitor(address: &str, blockchain: Blockchain, limit: usize) -> Result<()> {
    tracing::info!(address, %blockchain, "Monitoring address");

    let monitor = monitor()?;
    let transactions = monitor.monitor_address(address, blockchain).await?;

    println!("\n{}", RULE);
    println!("Transaction Analysis for {}...", short(address));
    println!("Blockchain: {}", blockchain);
    println!("{}", RULE);
    println!("Total transactions: {}\n", transactions.len());

    let mut patterns: BTreeMap<&str, usize> = BTreeMap::new();
    for tx in &transactions {
        *patterns.entry(tx.evasion_pattern.as_str()).or_insert(0) += 1;
    }
    let mut patterns: Vec<_> = patterns.into_iter().collect();
    patterns.sort_by(|a, b| b.1.cmp(&a.1));

    if !patterns.is_empty() {
        println!("Evasion Patterns Detected:");
        for (pattern, count) in patterns {
            println!("  - {}: {}", pattern, count);
        }
        println!();
    }

    println!("Recent Transactions:");
    for tx in transactions.iter().take(limit) {
        let direction = if tx.from_address.eq_ignore_ascii_case(address) { "OUT" } else { "IN " };
        let timestamp = tx
            .block_timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{} | {} | {} | Risk:{} [{}]",
            direction,
            timestamp,
            tx.value.round_dp(6),
            tx.risk_score,
            tx.evasion_pattern
        );
    }

    if let (Some(assessment), Some(profile)) = (monitor.assess(address), monitor.profiles().get(address)) {
        println!("\nRisk Profile:");
        println!("  Overall Risk Score: {}/100 ({:?})", assessment.risk_score, assessment.risk_level);
        println!("  Layering Events: {}", profile.layering_events);
        println!("  Mixing Events: {}", profile.mixing_events);
        println!("  Unique Counterparties: {}", profile.counterparties.len());
        for factor in &assessment.risk_factors {
            println!("  - {}", factor);
        }
    }
    Ok(())
}

async fn cmd_trace(address: &str, blockchain: Blockchain, hops: Option<u32>, json: bool) -> Result<()> {
    tracing::info!(address, %blockchain, "Tracing evasion network");

    let monitor = monitor()?;
    let network = monitor.trace_network(address, blockchain, hops).await?;

    println!("\n{}", RULE);
    println!("Evasion Network Analysis");
    println!("Seed: {}...", short(address));
    println!("{}\n", RULE);

    println!("Network Size:");
    println!("  Nodes (addresses): {}", network.nodes.len());
    println!("  Edges (transactions): {}", network.edges.len());
    println!("  High-risk transactions: {}", network.high_risk.len());
    if !network.unreachable.is_empty() {
        println!("  Unreachable addresses: {}", network.unreachable.len());
    }

    println!("\nNodes by hop distance:");
    for (hop, count) in network.hop_counts() {
        println!("  Hop {}: {} addresses", hop, count);
    }

    if !network.high_risk.is_empty() {
        println!("\nHigh-risk transactions (mixing/layering):");
        for tx_hash in network.high_risk.iter().take(10) {
            println!("  - {}...", tx_hash.get(..32).unwrap_or(tx_hash));
        }
    }

    if json {
        println!("\n{}", serde_json::to_string_pretty(&network)?);
    }
    Ok(())
}
