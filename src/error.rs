use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EbeyeError {
    #[error("invalid dataset accession: {0}")]
    InvalidAccession(String),

    #[error("missing config file pride-ebeye.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read PX descriptor at {0}")]
    DescriptorRead(PathBuf),

    #[error("failed to parse PX descriptor: {0}")]
    DescriptorParse(String),

    #[error("PX descriptor is missing {0}")]
    DescriptorShape(&'static str),

    #[error("failed to read submission summary at {0}")]
    SubmissionRead(PathBuf),

    #[error("failed to parse submission summary: {0}")]
    SubmissionParse(String),

    #[error("failed to read protein map at {0}")]
    ProteinsRead(PathBuf),

    #[error("failed to parse protein map: {0}")]
    ProteinsParse(String),

    #[error("project {0} is still private, refusing to generate EB-eye XML")]
    ProjectNotPublic(String),

    #[error("failed to serialize index document: {0}")]
    Serialize(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
