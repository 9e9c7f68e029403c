//! Property-based tests for cross-source merging
//!
//! - Keys are unique in the output
//! - Source sets and filled reference slots do not depend on input order
//! - Merging an already merged list changes nothing
//! - Merging a list concatenated with itself gives the same names and
//!   source sets as merging it once

use proptest::prelude::*;
use sanctions_service::{
    EntityType, MergeKey, ExactNameKey, SanctionedEntity, SanctionsMerger, SanctionsSource,
};
use std::collections::{BTreeMap, BTreeSet};

fn source_strategy() -> impl Strategy<Value = SanctionsSource> {
    prop_oneof![
        Just(SanctionsSource::Ofac),
        Just(SanctionsSource::Eu),
        Just(SanctionsSource::Uk),
    ]
}

fn entity_strategy() -> impl Strategy<Value = SanctionedEntity> {
    let names = prop::sample::select(vec![
        "Garantex", " garantex", "GARANTEX ", "Cryptex", "cryptex", "Suex", "Ivan Petrov",
    ]);
    (names, source_strategy(), proptest::option::of("[A-Z]{2}[0-9]{3}"))
        .prop_map(|(name, source, reference)| {
            let mut entity = SanctionedEntity::new(name, EntityType::Company, source);
            *entity.reference_mut(source) = reference;
            entity
        })
}

/// Per key: sources and which reference slots are filled
fn summary(entities: &[SanctionedEntity]) -> BTreeMap<String, (BTreeSet<SanctionsSource>, Vec<bool>)> {
    entities
        .iter()
        .map(|e| {
            let filled = SanctionsSource::ALL.iter().map(|s| e.reference(*s).is_some()).collect();
            (ExactNameKey.key(e), (e.sources.clone(), filled))
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_output_keys_unique(entities in prop::collection::vec(entity_strategy(), 0..30)) {
        let merged = SanctionsMerger::new().merge(entities);
        let keys: BTreeSet<String> = merged.iter().map(|e| ExactNameKey.key(e)).collect();
        prop_assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn prop_sources_and_references_order_independent(
        (entities, shuffled) in prop::collection::vec(entity_strategy(), 0..30)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let merger = SanctionsMerger::new();
        let forward = merger.merge(entities);
        let reordered = merger.merge(shuffled);
        prop_assert_eq!(summary(&forward), summary(&reordered));
    }

    #[test]
    fn prop_sources_are_union_of_inputs(entities in prop::collection::vec(entity_strategy(), 1..30)) {
        let mut expected: BTreeMap<String, BTreeSet<SanctionsSource>> = BTreeMap::new();
        for entity in &entities {
            expected
                .entry(ExactNameKey.key(entity))
                .or_default()
                .extend(entity.sources.iter().copied());
        }

        let merged = SanctionsMerger::new().merge(entities);
        for entity in &merged {
            prop_assert_eq!(&entity.sources, &expected[&ExactNameKey.key(entity)]);
        }
    }

    #[test]
    fn prop_merge_is_idempotent(entities in prop::collection::vec(entity_strategy(), 0..30)) {
        let merger = SanctionsMerger::new();
        let once = merger.merge(entities);
        let twice = merger.merge(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_doubled_input_matches_single_merge(entities in prop::collection::vec(entity_strategy(), 0..30)) {
        let merger = SanctionsMerger::new();
        let single = merger.merge(entities.clone());
        let doubled = merger.merge(entities.iter().chain(&entities).cloned());

        let names = |merged: &[SanctionedEntity]| -> Vec<String> {
            merged.iter().map(|e| e.name.clone()).collect()
        };
        let sources = |merged: &[SanctionedEntity]| -> BTreeMap<String, BTreeSet<SanctionsSource>> {
            merged.iter().map(|e| (ExactNameKey.key(e), e.sources.clone())).collect()
        };

        prop_assert_eq!(names(&single), names(&doubled));
        prop_assert_eq!(sources(&single), sources(&doubled));
    }
}
