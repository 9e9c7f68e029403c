// EU consolidated financial sanctions list (xmlFullSanctionsList_1_1)

use super::{download, finalize, non_empty, SanctionsFeed};
use crate::error::{ComplianceError, Result};
use crate::types::{EntityType, SanctionedEntity, SanctionsSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Export {
    #[serde(rename = "sanctionEntity", default)]
    entities: Vec<SanctionEntity>,
}

#[derive(Debug, Deserialize)]
struct SanctionEntity {
    #[serde(rename = "@euReferenceNumber")]
    eu_reference_number: Option<String>,
    #[serde(rename = "regulation", default)]
    regulations: Vec<Regulation>,
    // Repeatable children are lists so one extra element cannot fail the document
    #[serde(rename = "subjectType", default)]
    subject_types: Vec<SubjectType>,
    #[serde(rename = "nameAlias", default)]
    name_aliases: Vec<NameAlias>,
    #[serde(rename = "citizenship", default)]
    citizenships: Vec<CountryRef>,
    #[serde(rename = "address", default)]
    addresses: Vec<CountryRef>,
    #[serde(rename = "remark", default)]
    remarks: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Regulation {
    #[serde(rename = "@programme")]
    programme: Option<String>,
    #[serde(rename = "@entryIntoForceDate")]
    entry_into_force_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubjectType {
    #[serde(rename = "@code")]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameAlias {
    #[serde(rename = "@wholeName")]
    whole_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryRef {
    #[serde(rename = "@countryDescription")]
    country_description: Option<String>,
}

fn is_russia_programme(programme: &str) -> bool {
    let programme = programme.trim().to_uppercase();
    programme == "RUS" || programme.contains("RUSSIA")
}

fn is_russia_country(description: &str) -> bool {
    description.to_uppercase().contains("RUSSIA")
}

impl SanctionEntity {
    fn is_russia_related(&self) -> bool {
        let programme = self
            .regulations
            .iter()
            .filter_map(|r| r.programme.as_deref())
            .any(is_russia_programme);

        let country = self
            .citizenships
            .iter()
            .chain(&self.addresses)
            .filter_map(|c| c.country_description.as_deref())
            .any(is_russia_country);

        programme || country
    }

    fn programmes(&self) -> Vec<String> {
        let mut programmes: Vec<String> = Vec::new();
        for programme in self.regulations.iter().filter_map(|r| non_empty(r.programme.as_deref())) {
            if !programmes.contains(&programme) {
                programmes.push(programme);
            }
        }
        programmes
    }

    fn remarks(&self) -> String {
        self.remarks
            .iter()
            .filter_map(|r| non_empty(Some(r.as_str())))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Earliest entry-into-force date among the regulations
    fn designation_date(&self) -> Option<NaiveDate> {
        self.regulations
            .iter()
            .filter_map(|r| r.entry_into_force_date.as_deref())
            .filter_map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .min()
    }
}

pub struct EuFeed {
    client: Client,
    url: String,
}

impl EuFeed {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn parse_document(document: &str) -> Result<Vec<SanctionedEntity>> {
        let export: Export = quick_xml::de::from_str(document)
            .map_err(|e| ComplianceError::parse(SanctionsSource::Eu, e))?;

        let entities = export
            .entities
            .into_iter()
            .filter(SanctionEntity::is_russia_related)
            .map(|raw| {
                let mut names = raw
                    .name_aliases
                    .iter()
                    .filter_map(|alias| non_empty(alias.whole_name.as_deref()));
                let name = names.next().unwrap_or_default();
                let aliases: Vec<String> = names.collect();

                let entity_type = match raw.subject_types.first().and_then(|s| s.code.as_deref()) {
                    Some(code) if code.eq_ignore_ascii_case("person") => EntityType::Individual,
                    _ => EntityType::Company,
                };

                let mut entity = SanctionedEntity::new(name, entity_type, SanctionsSource::Eu);
                entity.eu_reference = non_empty(raw.eu_reference_number.as_deref());
                entity.aliases = aliases;
                entity.programs = raw.programmes();
                entity.designation_date = raw.designation_date();
                entity.remarks = raw.remarks();
                entity
            })
            .collect();

        Ok(finalize(entities))
    }
}

#[async_trait]
impl SanctionsFeed for EuFeed {
    fn source(&self) -> SanctionsSource {
        SanctionsSource::Eu
    }

    async fn fetch_raw(&self) -> Result<String> {
        download(&self.client, &self.url, SanctionsSource::Eu).await
    }

    fn parse(&self, document: &str) -> Result<Vec<SanctionedEntity>> {
        Self::parse_document(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EU_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<export xmlns="http://eu.europa.ec/fpi/fsd/export" generationDate="2024-05-01T10:00:00.000+02:00">
  <sanctionEntity designationDetails="" unitedNationId="" euReferenceNumber="EU.9410.22" logicalId="150001">
    <remark>Crypto-asset exchange</remark>
    <regulation regulationType="amendment" organisationType="council" publicationDate="2024-02-23" entryIntoForceDate="2024-02-23" numberTitle="2024/745" programme="RUS" logicalId="1"/>
    <subjectType code="enterprise" classificationCode="E"/>
    <nameAlias firstName="" middleName="" lastName="" wholeName="Garantex Europe OU" function="" gender="" title="" nameLanguage="" strong="true" regulationLanguage="en" logicalId="2"/>
    <nameAlias firstName="" middleName="" lastName="" wholeName="Grinex" function="" gender="" title="" nameLanguage="" strong="true" regulationLanguage="en" logicalId="3"/>
    <address city="Tallinn" street="" poBox="" zipCode="" region="" place="" asAtListingTime="false" countryIso2Code="EE" countryDescription="ESTONIA" logicalId="4"/>
  </sanctionEntity>
  <sanctionEntity designationDetails="" unitedNationId="" euReferenceNumber="EU.5001.1" logicalId="150002">
    <regulation regulationType="amendment" programme="BLR" entryIntoForceDate="2021-06-21" logicalId="5"/>
    <subjectType code="person" classificationCode="P"/>
    <nameAlias wholeName="Ivan Ivanov" logicalId="6"/>
    <citizenship region="" countryIso2Code="RU" countryDescription="RUSSIAN FEDERATION" logicalId="7"/>
  </sanctionEntity>
  <sanctionEntity designationDetails="" unitedNationId="" euReferenceNumber="EU.7000.3" logicalId="150003">
    <regulation regulationType="amendment" programme="IRN" logicalId="8"/>
    <subjectType code="person" classificationCode="P"/>
    <nameAlias wholeName="Someone Else" logicalId="9"/>
  </sanctionEntity>
  <sanctionEntity designationDetails="" unitedNationId="" euReferenceNumber="EU.7000.4" logicalId="150004">
    <regulation regulationType="amendment" programme="RUS" logicalId="10"/>
    <subjectType code="enterprise" classificationCode="E"/>
    <nameAlias wholeName="" logicalId="11"/>
  </sanctionEntity>
</export>"#;

    #[test]
    fn test_parse_filters_on_programme_and_country() {
        let entities = EuFeed::parse_document(EU_SAMPLE).unwrap();
        let names: Vec<_> = entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Garantex Europe OU", "Ivan Ivanov"]);
    }

    #[test]
    fn test_parse_entity_fields() {
        let entities = EuFeed::parse_document(EU_SAMPLE).unwrap();
        let garantex = &entities[0];

        assert_eq!(garantex.eu_reference.as_deref(), Some("EU.9410.22"));
        assert_eq!(garantex.aliases, vec!["Grinex"]);
        assert_eq!(garantex.programs, vec!["RUS"]);
        assert_eq!(garantex.designation_date, NaiveDate::from_ymd_opt(2024, 2, 23));
        assert_eq!(garantex.remarks, "Crypto-asset exchange");
        assert!(garantex.is_exchange);
        assert_eq!(garantex.sources.len(), 1);

        let ivanov = &entities[1];
        assert_eq!(ivanov.entity_type, EntityType::Individual);
        assert!(!ivanov.is_exchange);
    }

    #[test]
    fn test_repeated_remarks_are_joined() {
        let doc = r#"<export xmlns="http://eu.europa.ec/fpi/fsd/export">
  <sanctionEntity euReferenceNumber="EU.9999.1">
    <remark>Operates a crypto exchange</remark>
    <remark>Associated with Garantex</remark>
    <regulation programme="RUS"/>
    <subjectType code="enterprise"/>
    <nameAlias wholeName="Grinex"/>
  </sanctionEntity>
  <sanctionEntity euReferenceNumber="EU.9999.2">
    <regulation programme="RUS"/>
    <subjectType code="person"/>
    <nameAlias wholeName="Ivan Ivanov"/>
  </sanctionEntity>
</export>"#;

        let entities = EuFeed::parse_document(doc).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].remarks, "Operates a crypto exchange; Associated with Garantex");
        assert_eq!(entities[1].remarks, "");
        assert_eq!(entities[1].entity_type, EntityType::Individual);
    }

    #[test]
    fn test_malformed_document() {
        let err = EuFeed::parse_document("<export><sanctionEntity").unwrap_err();
        assert!(matches!(err, ComplianceError::Parse { feed: SanctionsSource::Eu, .. }));
    }
}
