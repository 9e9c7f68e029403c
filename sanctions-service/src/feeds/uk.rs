// UK consolidated list of financial sanctions targets (ConList.csv, 2022 format)

use super::{download, finalize, non_empty, SanctionsFeed};
use crate::error::{ComplianceError, Result};
use crate::types::{EntityType, SanctionedEntity, SanctionsSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

const HEADER_MARKER: &str = "Group ID";

#[derive(Debug, Deserialize)]
struct ConListRow {
    #[serde(rename = "Name 1", default)]
    name_1: String,
    #[serde(rename = "Name 2", default)]
    name_2: String,
    #[serde(rename = "Name 3", default)]
    name_3: String,
    #[serde(rename = "Name 4", default)]
    name_4: String,
    #[serde(rename = "Name 5", default)]
    name_5: String,
    #[serde(rename = "Name 6", default)]
    name_6: String,
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "Country of Origin", default)]
    country_of_origin: String,
    #[serde(rename = "Regime", default)]
    regime: String,
    #[serde(rename = "Group Type", default)]
    group_type: String,
    #[serde(rename = "Alias Type", default)]
    alias_type: String,
    #[serde(rename = "Listed On", default)]
    listed_on: String,
    #[serde(rename = "Other Information", default)]
    other_information: String,
    #[serde(rename = "Group ID", default)]
    group_id: String,
}

impl ConListRow {
    fn full_name(&self) -> String {
        [&self.name_1, &self.name_2, &self.name_3, &self.name_4, &self.name_5, &self.name_6]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_russia_related(&self) -> bool {
        [&self.country, &self.country_of_origin, &self.regime]
            .iter()
            .any(|field| field.to_lowercase().contains("russia"))
    }

    fn is_primary_name(&self) -> bool {
        self.alias_type.trim().eq_ignore_ascii_case("primary name")
    }

    fn entity_type(&self) -> EntityType {
        if self.group_type.trim().eq_ignore_ascii_case("individual") {
            EntityType::Individual
        } else {
            EntityType::Company
        }
    }
}

/// Rows of one designation, in file order
struct Group {
    rows: Vec<ConListRow>,
}

impl Group {
    fn into_entity(self) -> SanctionedEntity {
        let primary = self
            .rows
            .iter()
            .position(ConListRow::is_primary_name)
            .unwrap_or(0);
        let head = &self.rows[primary];

        let mut entity = SanctionedEntity::new(head.full_name(), head.entity_type(), SanctionsSource::Uk);
        entity.uk_reference = non_empty(Some(head.group_id.as_str()));
        entity.programs = non_empty(Some(head.regime.as_str())).into_iter().collect();
        entity.remarks = non_empty(Some(head.other_information.as_str())).unwrap_or_default();
        entity.designation_date = NaiveDate::parse_from_str(head.listed_on.trim(), "%d/%m/%Y").ok();

        for (i, row) in self.rows.iter().enumerate() {
            if i == primary {
                continue;
            }
            let alias = row.full_name();
            if !alias.is_empty() && alias != entity.name && !entity.aliases.contains(&alias) {
                entity.aliases.push(alias);
            }
        }

        entity
    }
}

/// Everything from the header row on; the published file starts with a
/// "Last Updated" line
fn strip_preamble(document: &str) -> Result<&str> {
    let mut offset = 0;
    for line in document.split_inclusive('\n') {
        if line.contains(HEADER_MARKER) {
            return Ok(&document[offset..]);
        }
        offset += line.len();
    }
    Err(ComplianceError::parse(SanctionsSource::Uk, "header row not found"))
}

pub struct UkFeed {
    client: Client,
    url: String,
}

impl UkFeed {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn parse_document(document: &str) -> Result<Vec<SanctionedEntity>> {
        let body = strip_preamble(document.trim_start_matches('\u{feff}'))?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let mut groups: Vec<Group> = Vec::new();
        // Map: Group ID -> index into `groups`
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in reader.deserialize::<ConListRow>() {
            let row = record.map_err(|e| ComplianceError::parse(SanctionsSource::Uk, e))?;
            if !row.is_russia_related() {
                continue;
            }

            // Rows without a group id stand alone
            if row.group_id.is_empty() {
                groups.push(Group { rows: vec![row] });
                continue;
            }

            match positions.get(&row.group_id) {
                Some(&index) => groups[index].rows.push(row),
                None => {
                    positions.insert(row.group_id.clone(), groups.len());
                    groups.push(Group { rows: vec![row] });
                }
            }
        }

        let entities = groups.into_iter().map(Group::into_entity).collect();
        Ok(finalize(entities))
    }
}

#[async_trait]
impl SanctionsFeed for UkFeed {
    fn source(&self) -> SanctionsSource {
        SanctionsSource::Uk
    }

    async fn fetch_raw(&self) -> Result<String> {
        download(&self.client, &self.url, SanctionsSource::Uk).await
    }

    fn parse(&self, document: &str) -> Result<Vec<SanctionedEntity>> {
        Self::parse_document(document)
    }
}
