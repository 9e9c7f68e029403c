//! Chain monitor for the sanctions tracker
//!
//! On-chain half of the tracker: pulls transactions for designated
//! addresses from block explorer APIs, tags each one with an evasion
//! pattern, scores it, and folds the results into per-address risk
//! profiles. The [`EvasionTracer`] walks outward from a seed address to
//! build a risk-scored subgraph of likely evasion chains.
//!
//! # Invariants
//!
//! - Scores are pure functions of their inputs and always land in 0..=100
//! - An address profile's score is derived on read, never stored
//! - A trace visits each address at most once and never exceeds `max_hops`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;
pub mod classifier;
pub mod scoring;
pub mod profile;
pub mod source;
pub mod etherscan;
pub mod trongrid;
pub mod memory;
pub mod tracer;
pub mod monitor;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use classifier::EvasionClassifier;
pub use scoring::{ProfileAssessment, RiskScorer};
pub use profile::{AddressRiskProfile, ProfileStore};
pub use source::ChainDataSource;
pub use etherscan::EtherscanClient;
pub use trongrid::TronGridClient;
pub use memory::InMemoryChainSource;
pub use tracer::{EvasionNetwork, EvasionTracer, NetworkEdge, NetworkNode};
pub use monitor::{ChainMonitor, WatchedAddress};
pub use config::{MonitorConfig, TraceConfig};
