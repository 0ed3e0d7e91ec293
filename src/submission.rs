//! Submission-level facts supplied by the archive's submission model.
//!
//! These are independent of the PX descriptor: the index builder renders
//! sample annotations and file locations from here, never from the
//! projected record's own file-name list.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::CvFact;
use crate::error::EbeyeError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmissionType {
    #[default]
    Complete,
    Partial,
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionType::Complete => write!(f, "COMPLETE"),
            SubmissionType::Partial => write!(f, "PARTIAL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionFacts {
    pub is_public: bool,
    #[serde(default)]
    pub submission_type: SubmissionType,
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub sample_protocol: Option<String>,
    #[serde(default)]
    pub data_protocol: Option<String>,
    #[serde(default)]
    pub species: Vec<CvFact>,
    #[serde(default)]
    pub instruments: Vec<CvFact>,
    #[serde(default)]
    pub cell_types: Vec<CvFact>,
    #[serde(default)]
    pub diseases: Vec<CvFact>,
    #[serde(default)]
    pub tissues: Vec<CvFact>,
    #[serde(default)]
    pub quantifications: Vec<CvFact>,
    #[serde(default)]
    pub software: Vec<CvFact>,
    /// Resolved file locations, one `dataset_file` field each.
    #[serde(default)]
    pub data_files: Vec<String>,
}

impl SubmissionFacts {
    pub fn from_json(text: &str) -> Result<Self, EbeyeError> {
        serde_json::from_str(text).map_err(|err| EbeyeError::SubmissionParse(err.to_string()))
    }
}
