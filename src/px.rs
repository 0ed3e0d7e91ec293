//! Typed accessors over a parsed ProteomeXchange submission descriptor.
//!
//! The projector never touches raw markup; it consumes the field lists
//! assembled here. Parsing is tolerant: structurally required pieces
//! (root element, accession, summary, announce date) fail the parse,
//! everything else degrades to an empty list or empty string.

use chrono::{DateTime, NaiveDate};
use roxmltree::{Document, Node};

use crate::domain::DatasetAccession;
use crate::error::EbeyeError;

/// One controlled-vocabulary term as written in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvTerm {
    pub accession: String,
    pub name: String,
    pub value: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactEntry {
    pub terms: Vec<CvTerm>,
}

#[derive(Debug, Clone, Default)]
pub struct SpeciesEntry {
    pub terms: Vec<CvTerm>,
}

#[derive(Debug, Clone, Default)]
pub struct InstrumentEntry {
    pub terms: Vec<CvTerm>,
}

#[derive(Debug, Clone, Default)]
pub struct PublicationEntry {
    pub terms: Vec<CvTerm>,
}

#[derive(Debug, Clone)]
pub struct DatasetLinkEntry {
    pub term: CvTerm,
}

#[derive(Debug, Clone)]
pub struct DatasetFileEntry {
    pub name: String,
    pub terms: Vec<CvTerm>,
}

/// Field lists of one parsed PX submission descriptor.
#[derive(Debug, Clone)]
pub struct PxDocument {
    pub accession: DatasetAccession,
    pub repository_name: String,
    pub title: String,
    pub description: String,
    pub announce_date: NaiveDate,
    pub review_level: String,
    pub identifiers: Vec<CvTerm>,
    pub species: Vec<SpeciesEntry>,
    pub instruments: Vec<InstrumentEntry>,
    pub ptms: Vec<CvTerm>,
    pub contacts: Vec<ContactEntry>,
    pub publications: Vec<PublicationEntry>,
    pub keywords: Vec<CvTerm>,
    pub dataset_links: Vec<DatasetLinkEntry>,
    pub data_files: Vec<DatasetFileEntry>,
}

impl PxDocument {
    pub fn parse(text: &str) -> Result<Self, EbeyeError> {
        let doc =
            Document::parse(text).map_err(|err| EbeyeError::DescriptorParse(err.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != "ProteomeXchangeDataset" {
            return Err(EbeyeError::DescriptorShape("ProteomeXchangeDataset"));
        }

        let accession: DatasetAccession = root
            .attribute("id")
            .ok_or(EbeyeError::DescriptorShape("dataset id"))?
            .parse()?;

        let summary =
            child(root, "DatasetSummary").ok_or(EbeyeError::DescriptorShape("DatasetSummary"))?;
        let title = summary.attribute("title").unwrap_or_default().to_string();
        let repository_name = summary
            .attribute("hostingRepository")
            .unwrap_or_default()
            .to_string();
        let announce_date = parse_announce_date(
            summary
                .attribute("announceDate")
                .ok_or(EbeyeError::DescriptorShape("announceDate"))?,
        )?;
        let description = child(summary, "Description")
            .and_then(|node| node.text())
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        let review_level = child(summary, "ReviewLevel")
            .and_then(first_cv_term)
            .map(|term| term.name)
            .unwrap_or_default();

        let identifiers = child(root, "DatasetIdentifierList")
            .map(|list| {
                elements(list, "DatasetIdentifier")
                    .into_iter()
                    .flat_map(cv_terms)
                    .collect()
            })
            .unwrap_or_default();

        let species = grouped(root, "SpeciesList", "Species", |node| SpeciesEntry {
            terms: cv_terms(node),
        });
        let instruments = grouped(root, "InstrumentList", "Instrument", |node| {
            InstrumentEntry {
                terms: cv_terms(node),
            }
        });
        let contacts = grouped(root, "ContactList", "Contact", |node| ContactEntry {
            terms: cv_terms(node),
        });
        let publications = grouped(root, "PublicationList", "Publication", |node| {
            PublicationEntry {
                terms: cv_terms(node),
            }
        });

        let ptms = child(root, "ModificationList")
            .map(cv_terms)
            .unwrap_or_default();
        let keywords = child(root, "KeywordList")
            .map(cv_terms)
            .unwrap_or_default();

        let dataset_links = child(root, "FullDatasetLinkList")
            .map(|list| {
                elements(list, "FullDatasetLink")
                    .into_iter()
                    .filter_map(|node| first_cv_term(node).map(|term| DatasetLinkEntry { term }))
                    .collect()
            })
            .unwrap_or_default();

        let data_files = grouped(root, "DatasetFileList", "DatasetFile", |node| {
            DatasetFileEntry {
                name: node.attribute("name").unwrap_or_default().to_string(),
                terms: cv_terms(node),
            }
        });

        Ok(Self {
            accession,
            repository_name,
            title,
            description,
            announce_date,
            review_level,
            identifiers,
            species,
            instruments,
            ptms,
            contacts,
            publications,
            keywords,
            dataset_links,
            data_files,
        })
    }
}

fn parse_announce_date(value: &str) -> Result<NaiveDate, EbeyeError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| EbeyeError::DescriptorParse(format!("unparseable announce date: {value}")))
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn elements<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == name)
        .collect()
}

fn grouped<'a, 'input, T>(
    root: Node<'a, 'input>,
    list_name: &str,
    entry_name: &str,
    build: impl Fn(Node<'a, 'input>) -> T,
) -> Vec<T> {
    child(root, list_name)
        .map(|list| elements(list, entry_name).into_iter().map(build).collect())
        .unwrap_or_default()
}

/// Terms without an accession attribute are dropped; they cannot drive any
/// classification rule.
fn cv_terms(node: Node<'_, '_>) -> Vec<CvTerm> {
    elements(node, "cvParam")
        .into_iter()
        .filter_map(cv_term)
        .collect()
}

fn first_cv_term(node: Node<'_, '_>) -> Option<CvTerm> {
    elements(node, "cvParam").into_iter().find_map(cv_term)
}

fn cv_term(node: Node<'_, '_>) -> Option<CvTerm> {
    let accession = node.attribute("accession")?.to_string();
    Some(CvTerm {
        accession,
        name: node.attribute("name").unwrap_or_default().to_string(),
        value: node.attribute("value").map(str::to_string),
        unit: node.attribute("unitName").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const MINIMAL: &str = r#"
        <ProteomeXchangeDataset id="PXD000001" formatVersion="1.4.0">
          <DatasetSummary announceDate="2012-03-08" hostingRepository="PRIDE" title="Test dataset">
            <Description>TMT spikes</Description>
            <ReviewLevel>
              <cvParam cvRef="PRIDE" accession="PRIDE:0000414" name="Peer-reviewed dataset"/>
            </ReviewLevel>
          </DatasetSummary>
          <SpeciesList>
            <Species>
              <cvParam cvRef="MS" accession="MS:1001469" name="taxonomy: scientific name" value="Erwinia carotovora"/>
              <cvParam cvRef="MS" accession="MS:1001467" name="taxonomy: NCBI TaxID" value="554"/>
            </Species>
          </SpeciesList>
          <KeywordList>
            <cvParam cvRef="MS" accession="MS:1001925" name="submitter keyword" value="proteogenomics"/>
          </KeywordList>
        </ProteomeXchangeDataset>
    "#;

    #[test]
    fn parse_minimal_descriptor() {
        let doc = PxDocument::parse(MINIMAL).unwrap();
        assert_eq!(doc.accession.as_str(), "PXD000001");
        assert_eq!(doc.repository_name, "PRIDE");
        assert_eq!(doc.title, "Test dataset");
        assert_eq!(doc.description, "TMT spikes");
        assert_eq!(doc.review_level, "Peer-reviewed dataset");
        assert_eq!(doc.announce_date, NaiveDate::from_ymd_opt(2012, 3, 8).unwrap());
        assert_eq!(doc.species.len(), 1);
        assert_eq!(doc.species[0].terms.len(), 2);
        assert_eq!(doc.keywords.len(), 1);
        assert!(doc.contacts.is_empty());
        assert!(doc.dataset_links.is_empty());
    }

    #[test]
    fn parse_rejects_malformed_markup() {
        let err = PxDocument::parse("<ProteomeXchangeDataset").unwrap_err();
        assert_matches!(err, EbeyeError::DescriptorParse(_));
    }

    #[test]
    fn parse_rejects_wrong_root() {
        let err = PxDocument::parse("<Dataset id=\"PXD000001\"/>").unwrap_err();
        assert_matches!(err, EbeyeError::DescriptorShape("ProteomeXchangeDataset"));
    }

    #[test]
    fn parse_rejects_missing_announce_date() {
        let text = r#"
            <ProteomeXchangeDataset id="PXD000001">
              <DatasetSummary title="t" hostingRepository="PRIDE"/>
            </ProteomeXchangeDataset>
        "#;
        let err = PxDocument::parse(text).unwrap_err();
        assert_matches!(err, EbeyeError::DescriptorShape("announceDate"));
    }

    #[test]
    fn announce_date_accepts_rfc3339() {
        let date = parse_announce_date("2014-09-22T00:00:00Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2014, 9, 22).unwrap());
    }

    #[test]
    fn cv_param_without_accession_is_dropped() {
        let text = r#"
            <ProteomeXchangeDataset id="PXD000001">
              <DatasetSummary announceDate="2012-03-08" hostingRepository="PRIDE" title="t"/>
              <KeywordList>
                <cvParam name="orphan" value="x"/>
                <cvParam accession="MS:1001925" name="submitter keyword" value="kept"/>
              </KeywordList>
            </ProteomeXchangeDataset>
        "#;
        let doc = PxDocument::parse(text).unwrap();
        assert_eq!(doc.keywords.len(), 1);
        assert_eq!(doc.keywords[0].value.as_deref(), Some("kept"));
    }
}
