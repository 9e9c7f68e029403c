use crate::merge::NormalizedNameKey;
use crate::types::SanctionedEntity;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use strsim::jaro_winkler;
use tracing::{debug, info};

pub const DEFAULT_NAME_THRESHOLD: f64 = 0.92;

#[derive(Debug, Clone, Serialize)]
pub struct NameMatch {
    pub entity: SanctionedEntity,
    /// Name or alias that produced the best score
    pub matched_name: String,
    /// Jaro-Winkler similarity of the normalized names (1.0 = identical)
    pub score: f64,
}

/// One loaded list; never mutated after construction
#[derive(Debug, Default)]
struct IndexData {
    entities: Vec<SanctionedEntity>,
    // Map: lowercased crypto address -> positions in `entities`
    addresses: HashMap<String, Vec<usize>>,
}

impl IndexData {
    fn build(entities: Vec<SanctionedEntity>) -> Self {
        let mut addresses: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, entity) in entities.iter().enumerate() {
            for crypto in &entity.crypto_addresses {
                let key = crypto.address.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                addresses.entry(key).or_default().push(position);
            }
        }
        Self { entities, addresses }
    }
}

/// In-memory lookup over a merged sanctions list
pub struct SanctionsIndex {
    // Readers see either the previous list or the next one, never a mix
    data: RwLock<Arc<IndexData>>,
    name_threshold: f64,
}

impl SanctionsIndex {
    pub fn new(name_threshold: f64) -> Self {
        Self {
            data: RwLock::new(Arc::new(IndexData::default())),
            name_threshold,
        }
    }

    fn snapshot(&self) -> Arc<IndexData> {
        self.data.read().clone()
    }

    /// Replace the indexed list
    pub fn load(&self, entities: Vec<SanctionedEntity>) {
        let data = IndexData::build(entities);
        info!(
            entities = data.entities.len(),
            addresses = data.addresses.len(),
            "Loaded sanctions index"
        );
        *self.data.write() = Arc::new(data);
    }

    /// Entities that designate this address (case-insensitive)
    pub fn check_address(&self, address: &str) -> Vec<SanctionedEntity> {
        let data = self.snapshot();
        let key = address.trim().to_lowercase();
        let Some(positions) = data.addresses.get(&key) else {
            return Vec::new();
        };

        // Merged records may list the same address more than once
        let mut unique: Vec<usize> = positions.clone();
        unique.dedup();

        unique
            .iter()
            .filter_map(|position| data.entities.get(*position).cloned())
            .collect()
    }

    /// Entities whose name or an alias is similar enough, best first
    pub fn check_name(&self, name: &str) -> Vec<NameMatch> {
        let query = NormalizedNameKey::normalize(name);
        if query.is_empty() {
            return Vec::new();
        }

        let data = self.snapshot();
        let mut matches: Vec<NameMatch> = data
            .entities
            .iter()
            .filter_map(|entity| {
                let (matched_name, score) = std::iter::once(&entity.name)
                    .chain(&entity.aliases)
                    .map(|candidate| (candidate, similarity(&query, candidate)))
                    .fold(None::<(&String, f64)>, |best, (candidate, score)| match best {
                        Some((_, best_score)) if best_score >= score => best,
                        _ => Some((candidate, score)),
                    })?;

                if score < self.name_threshold {
                    return None;
                }

                debug!(query = name, matched = %matched_name, score, "Sanctions name match");
                Some(NameMatch {
                    entity: entity.clone(),
                    matched_name: matched_name.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entity.name.cmp(&b.entity.name))
        });
        matches
    }

    /// Entities classified as known exchanges, by name
    pub fn exchanges(&self) -> Vec<SanctionedEntity> {
        let mut exchanges: Vec<SanctionedEntity> = self
            .snapshot()
            .entities
            .iter()
            .filter(|entity| entity.is_exchange)
            .cloned()
            .collect();
        exchanges.sort_by(|a, b| a.name.cmp(&b.name));
        exchanges
    }

    pub fn total_entries(&self) -> usize {
        self.data.read().entities.len()
    }

    pub fn total_addresses(&self) -> usize {
        self.data.read().addresses.len()
    }
}

impl Default for SanctionsIndex {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_THRESHOLD)
    }
}

fn similarity(normalized_query: &str, candidate: &str) -> f64 {
    let candidate = NormalizedNameKey::normalize(candidate);
    if candidate.is_empty() {
        return 0.0;
    }
    if candidate == normalized_query {
        return 1.0;
    }
    jaro_winkler(normalized_query, &candidate)
}
