//! Known Russia-linked sanctioned exchanges

use crate::types::{EntityType, SanctionedEntity};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownExchange {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Estimated lifetime volume in USD, where one has been published
    pub volume_usd: Option<i64>,
}

pub const KNOWN_EXCHANGES: [KnownExchange; 5] = [
    KnownExchange { name: "garantex", aliases: &["grinex"], volume_usd: Some(6_000_000_000) },
    KnownExchange { name: "cryptex", aliases: &[], volume_usd: Some(5_880_000_000) },
    KnownExchange { name: "suex", aliases: &[], volume_usd: Some(370_000_000) },
    KnownExchange { name: "chatex", aliases: &[], volume_usd: Some(200_000_000) },
    KnownExchange { name: "bitpapa", aliases: &[], volume_usd: None },
];

impl KnownExchange {
    fn matches(&self, name_lower: &str) -> bool {
        name_lower.contains(self.name) || self.aliases.iter().any(|alias| name_lower.contains(alias))
    }
}

/// Substring match on the lowercased name; first table entry wins
pub fn find_exchange(name: &str) -> Option<&'static KnownExchange> {
    let name_lower = name.to_lowercase();
    KNOWN_EXCHANGES.iter().find(|exchange| exchange.matches(&name_lower))
}

/// Set the exchange fields when the entity name matches the table.
/// Returns whether it matched.
pub fn classify(entity: &mut SanctionedEntity) -> bool {
    match find_exchange(&entity.name) {
        Some(exchange) => {
            entity.is_exchange = true;
            entity.entity_type = EntityType::Exchange;
            entity.exchange_name = Some(exchange.name.to_string());
            entity.estimated_volume_usd = exchange.volume_usd.map(Decimal::from);
            true
        }
        None => false,
    }
}
