//! Cross-source entity reconciliation
//!
//! Records are grouped by a merge key. The first record under a key is the
//! canonical one; later records fold into it:
//!
//! - `sources` is a set union
//! - an empty reference slot is filled from the incoming record, a filled
//!   one is never overwritten
//! - crypto addresses and aliases are appended as-is (duplicates allowed)
//! - exchange fields come from whichever record set them first
//!
//! Output keeps the order in which each key first appeared.
//!
//! Two different real-world entities whose names produce the same key are
//! merged into one record. Swap in a stricter [`MergeKey`] to change that.

use crate::types::{SanctionedEntity, SanctionsSource};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Decides which records describe the same entity
pub trait MergeKey {
    fn key(&self, entity: &SanctionedEntity) -> String;
}

impl<F> MergeKey for F
where
    F: Fn(&SanctionedEntity) -> String,
{
    fn key(&self, entity: &SanctionedEntity) -> String {
        self(entity)
    }
}

/// Trimmed, lowercased name. Exact match only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactNameKey;

impl MergeKey for ExactNameKey {
    fn key(&self, entity: &SanctionedEntity) -> String {
        entity.name.trim().to_lowercase()
    }
}

/// Lowercased name with punctuation removed and whitespace collapsed
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedNameKey;

impl NormalizedNameKey {
    pub fn normalize(name: &str) -> String {
        static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
        let re = PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));
        let cleaned = re.replace_all(name, "");
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.to_lowercase()
    }
}

impl MergeKey for NormalizedNameKey {
    fn key(&self, entity: &SanctionedEntity) -> String {
        Self::normalize(&entity.name)
    }
}

pub struct SanctionsMerger<K = ExactNameKey> {
    key: K,
}

impl SanctionsMerger<ExactNameKey> {
    pub fn new() -> Self {
        Self { key: ExactNameKey }
    }
}

impl Default for SanctionsMerger<ExactNameKey> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: MergeKey> SanctionsMerger<K> {
    pub fn with_key(key: K) -> Self {
        Self { key }
    }

    /// Deduplicate per-source records, left to right
    pub fn merge(&self, entities: impl IntoIterator<Item = SanctionedEntity>) -> Vec<SanctionedEntity> {
        let mut merged: Vec<SanctionedEntity> = Vec::new();
        // Map: merge key -> index into `merged`
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut input_count = 0usize;

        for entity in entities {
            input_count += 1;
            let key = self.key.key(&entity);

            match positions.get(&key) {
                Some(&index) => fold_into(&mut merged[index], entity),
                None => {
                    positions.insert(key, merged.len());
                    merged.push(entity);
                }
            }
        }

        info!(input = input_count, merged = merged.len(), "Merged sanctions records");
        merged
    }
}

fn fold_into(existing: &mut SanctionedEntity, incoming: SanctionedEntity) {
    if existing.entity_type != incoming.entity_type {
        debug!(
            name = %existing.name,
            existing = ?existing.entity_type,
            incoming = ?incoming.entity_type,
            "Merging records with different subject types"
        );
    }

    existing.sources.extend(incoming.sources.iter().copied());

    for source in SanctionsSource::ALL {
        let slot = existing.reference_mut(source);
        if slot.is_none() {
            *slot = incoming.reference(source).map(str::to_string);
        }
    }

    if !existing.is_exchange && incoming.is_exchange {
        existing.is_exchange = true;
        existing.entity_type = incoming.entity_type;
        existing.exchange_name = incoming.exchange_name;
        existing.estimated_volume_usd = incoming.estimated_volume_usd;
    }

    for program in incoming.programs {
        if !existing.programs.contains(&program) {
            existing.programs.push(program);
        }
    }

    if existing.designation_date.is_none() {
        existing.designation_date = incoming.designation_date;
    }

    existing.crypto_addresses.extend(incoming.crypto_addresses);
    existing.aliases.extend(incoming.aliases);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CryptoAddress, EntityType};
    use chain_monitor::Blockchain;
    use std::collections::BTreeSet;

    fn entity(name: &str, source: SanctionsSource) -> SanctionedEntity {
        SanctionedEntity::new(name, EntityType::Company, source)
    }

    fn address(addr: &str) -> CryptoAddress {
        CryptoAddress {
            address: addr.to_string(),
            blockchain: Some(Blockchain::Ethereum),
            currency: "ETH".to_string(),
        }
    }

    #[test]
    fn test_garantex_across_sources() {
        let merged = SanctionsMerger::new().merge(vec![
            entity("Garantex", SanctionsSource::Ofac),
            entity(" garantex ", SanctionsSource::Eu),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Garantex");
        assert_eq!(
            merged[0].sources,
            BTreeSet::from([SanctionsSource::Ofac, SanctionsSource::Eu])
        );
    }

    #[test]
    fn test_first_writer_wins_for_references() {
        let mut first = entity("Cryptex", SanctionsSource::Ofac);
        first.ofac_id = Some("32001".to_string());

        let mut second = entity("CRYPTEX", SanctionsSource::Uk);
        second.ofac_id = Some("99999".to_string());
        second.uk_reference = Some("RUS1234".to_string());

        let merged = SanctionsMerger::new().merge(vec![first, second]);

        assert_eq!(merged[0].ofac_id.as_deref(), Some("32001"));
        assert_eq!(merged[0].uk_reference.as_deref(), Some("RUS1234"));
        assert_eq!(merged[0].eu_reference, None);
    }

    #[test]
    fn test_lists_are_concatenated() {
        let mut first = entity("Suex", SanctionsSource::Ofac);
        first.crypto_addresses.push(address("0x1"));
        first.aliases.push("Suex OTC".to_string());

        let mut second = entity("suex", SanctionsSource::Eu);
        second.crypto_addresses.push(address("0x1"));
        second.crypto_addresses.push(address("0x2"));
        second.aliases.push("Suex OTC".to_string());

        let merged = SanctionsMerger::new().merge(vec![first, second]);

        assert_eq!(merged[0].crypto_addresses.len(), 3);
        assert_eq!(merged[0].aliases, vec!["Suex OTC", "Suex OTC"]);
    }

    #[test]
    fn test_output_order_is_first_appearance() {
        let merged = SanctionsMerger::new().merge(vec![
            entity("B", SanctionsSource::Ofac),
            entity("A", SanctionsSource::Ofac),
            entity("b", SanctionsSource::Uk),
            entity("C", SanctionsSource::Eu),
        ]);

        let names: Vec<_> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_exchange_fields_carry_over_from_first_setter() {
        let plain = entity("Chatex", SanctionsSource::Uk);
        let mut classified = entity("chatex", SanctionsSource::Ofac);
        crate::exchanges::classify(&mut classified);

        let merged = SanctionsMerger::new().merge(vec![plain, classified]);

        assert!(merged[0].is_exchange);
        assert_eq!(merged[0].exchange_name.as_deref(), Some("chatex"));
        assert_eq!(merged[0].entity_type, EntityType::Exchange);
    }

    #[test]
    fn test_normalized_key() {
        assert_eq!(
            NormalizedNameKey::normalize("Garantex Europe, O.U."),
            "garantex europe ou"
        );

        let exact = SanctionsMerger::new().merge(vec![
            entity("Garantex Europe, O.U.", SanctionsSource::Ofac),
            entity("garantex  europe ou", SanctionsSource::Eu),
        ]);
        assert_eq!(exact.len(), 2);

        let normalized = SanctionsMerger::with_key(NormalizedNameKey).merge(exact);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].sources.len(), 2);
    }

    #[test]
    fn test_closure_key() {
        // Merge on the first word only
        let first_word = |e: &SanctionedEntity| {
            e.name.split_whitespace().next().unwrap_or("").to_lowercase()
        };
        let merged = SanctionsMerger::with_key(first_word).merge(vec![
            entity("Bitpapa IC FZC", SanctionsSource::Ofac),
            entity("BITPAPA", SanctionsSource::Uk),
        ]);
        assert_eq!(merged.len(), 1);
    }
}
