// OFAC Specially Designated Nationals list (sdn.xml)

use super::{download, finalize, non_empty, SanctionsFeed};
use crate::error::{ComplianceError, Result};
use crate::types::{CryptoAddress, EntityType, SanctionedEntity, SanctionsSource};
use async_trait::async_trait;
use chain_monitor::Blockchain;
use reqwest::Client;
use serde::Deserialize;

/// Program tags that mark an entry as Russia-related
pub const RUSSIA_PROGRAMS: [&str; 6] = [
    "RUSSIA",
    "RUSSIA-EO14024",
    "RUSSIA-EO14039",
    "UKRAINE-EO13661",
    "RUSSIA-UKRAINE",
    "CYBER2",
];

const DIGITAL_CURRENCY_ID: &str = "Digital Currency Address";

#[derive(Debug, Deserialize)]
struct SdnList {
    #[serde(rename = "sdnEntry", default)]
    entries: Vec<SdnEntry>,
}

#[derive(Debug, Deserialize)]
struct SdnEntry {
    uid: Option<String>,
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
    #[serde(rename = "sdnType")]
    sdn_type: Option<String>,
    #[serde(rename = "programList", default)]
    program_list: ProgramList,
    #[serde(rename = "idList", default)]
    id_list: IdList,
    #[serde(rename = "akaList", default)]
    aka_list: AkaList,
    remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProgramList {
    #[serde(rename = "program", default)]
    programs: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IdList {
    #[serde(rename = "id", default)]
    ids: Vec<SdnId>,
}

#[derive(Debug, Deserialize)]
struct SdnId {
    #[serde(rename = "idType")]
    id_type: Option<String>,
    #[serde(rename = "idNumber")]
    id_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AkaList {
    #[serde(rename = "aka", default)]
    akas: Vec<Aka>,
}

#[derive(Debug, Deserialize)]
struct Aka {
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
}

fn join_name(first: Option<&str>, last: Option<&str>) -> String {
    [non_empty(first), non_empty(last)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_russia_program(program: &str) -> bool {
    RUSSIA_PROGRAMS.iter().any(|tag| program.contains(tag))
}

/// Chain for a "Digital Currency Address - <TICKER>" id type
pub fn ticker_blockchain(ticker: &str) -> Option<Blockchain> {
    if ticker.contains("XBT") || ticker.contains("BTC") {
        Some(Blockchain::Bitcoin)
    } else if ticker.contains("ETH") {
        Some(Blockchain::Ethereum)
    } else if ticker.contains("TRX") {
        Some(Blockchain::Tron)
    } else if ticker.contains("USDT") {
        Some(Blockchain::UsdtTrc20)
    } else {
        None
    }
}

fn crypto_address(id: &SdnId) -> Option<CryptoAddress> {
    let id_type = id.id_type.as_deref()?;
    if !id_type.contains(DIGITAL_CURRENCY_ID) {
        return None;
    }

    let ticker = id_type
        .rsplit('-')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    Some(CryptoAddress {
        address: non_empty(id.id_number.as_deref()).unwrap_or_default(),
        blockchain: ticker_blockchain(&ticker),
        currency: ticker,
    })
}

pub struct OfacFeed {
    client: Client,
    url: String,
}

impl OfacFeed {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn parse_document(document: &str) -> Result<Vec<SanctionedEntity>> {
        let list: SdnList = quick_xml::de::from_str(document)
            .map_err(|e| ComplianceError::parse(SanctionsSource::Ofac, e))?;

        let entities = list
            .entries
            .into_iter()
            .filter_map(|entry| {
                let programs: Vec<String> = entry
                    .program_list
                    .programs
                    .into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| is_russia_program(p))
                    .collect();

                if programs.is_empty() {
                    return None;
                }

                let name = join_name(entry.first_name.as_deref(), entry.last_name.as_deref());
                let entity_type = entry
                    .sdn_type
                    .as_deref()
                    .map(EntityType::from_label)
                    .unwrap_or(EntityType::Company);

                let mut entity = SanctionedEntity::new(name, entity_type, SanctionsSource::Ofac);
                entity.ofac_id = non_empty(entry.uid.as_deref());
                entity.programs = programs;
                entity.remarks = non_empty(entry.remarks.as_deref()).unwrap_or_default();
                entity.crypto_addresses = entry.id_list.ids.iter().filter_map(crypto_address).collect();
                entity.aliases = entry
                    .aka_list
                    .akas
                    .iter()
                    .map(|aka| join_name(aka.first_name.as_deref(), aka.last_name.as_deref()))
                    .filter(|alias| !alias.is_empty())
                    .collect();

                Some(entity)
            })
            .collect();

        Ok(finalize(entities))
    }
}

#[async_trait]
impl SanctionsFeed for OfacFeed {
    fn source(&self) -> SanctionsSource {
        SanctionsSource::Ofac
    }

    async fn fetch_raw(&self) -> Result<String> {
        download(&self.client, &self.url, SanctionsSource::Ofac).await
    }

    fn parse(&self, document: &str) -> Result<Vec<SanctionedEntity>> {
        Self::parse_document(document)
    }
}
