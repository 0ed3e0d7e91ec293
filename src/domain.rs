use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EbeyeError;

/// ProteomeCentral landing page; the dataset link falls back to this when the
/// descriptor carries no repository-hosted link.
pub const PROTEOME_CENTRAL_URL: &str =
    "http://proteomecentral.proteomexchange.org/cgi/GetDataset?ID=";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetAccession(String);

impl DatasetAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn canonical_dataset_url(&self) -> String {
        format!("{PROTEOME_CENTRAL_URL}{}", self.0)
    }
}

impl fmt::Display for DatasetAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetAccession {
    type Err = EbeyeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let prefix_len = normalized
            .chars()
            .take_while(|ch| ch.is_ascii_alphabetic())
            .count();
        let digits = &normalized[prefix_len..];
        let is_valid =
            prefix_len >= 2 && !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(EbeyeError::InvalidAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Normalized controlled-vocabulary fact, the unit exchanged between the
/// projector and the index builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvFact {
    pub accession: String,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl CvFact {
    pub fn new(
        accession: impl Into<String>,
        name: impl Into<String>,
        unit: Option<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            accession: accession.into(),
            name: name.into(),
            unit,
            value,
        }
    }
}

/// A contact classified out of the descriptor. All fields are optional;
/// an entirely empty person stands in for a missing submitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub affiliation: Option<String>,
}

impl Person {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.email.is_none() && self.affiliation.is_none()
    }
}

/// Bibliographic reference. At least one field is set; candidates with
/// neither a PubMed id nor citation text are dropped by the projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub pubmed_id: Option<u32>,
    pub citation: Option<String>,
}

/// Normalized projection of one PX submission descriptor. Built once per
/// descriptor and immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    pub accession: DatasetAccession,
    pub repository_name: String,
    pub title: String,
    pub description: String,
    pub instruments: Vec<CvFact>,
    pub ptms: Vec<CvFact>,
    /// Species terms with the taxonomy terms removed.
    pub species: Vec<CvFact>,
    pub taxonomy_ids: Vec<String>,
    pub submitter: Person,
    pub lab_heads: Vec<Person>,
    pub publication_date: DateTime<Utc>,
    pub data_file_names: Vec<String>,
    pub submitter_keywords: Vec<String>,
    /// Curator tags plus the review-level tag appended after the scan.
    pub curator_tags: Vec<String>,
    pub review_level: String,
    /// Never empty; falls back to the ProteomeCentral URL for the accession.
    pub dataset_link: String,
    pub experiment_types: Vec<CvFact>,
    pub references: Vec<Reference>,
    pub doi: Option<String>,
}
