//! Orchestration: read descriptor and summary, project, build, write.
//!
//! The projection and builder layers stay pure; all I/O and the atomic
//! write live here. Output files are written through a tempfile in the
//! target directory and persisted only after the full document is
//! serialized, so a refused or failed export never leaves a partial file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::ProjectRecord;
use crate::ebeye;
use crate::error::EbeyeError;
use crate::projector;
use crate::px::PxDocument;
use crate::submission::SubmissionFacts;
use crate::xml;

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub items: Vec<ExportItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportItem {
    pub accession: String,
    pub action: String,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectResult {
    pub record: ProjectRecord,
}

pub fn export_entry(
    px_path: &Utf8Path,
    submission_path: &Utf8Path,
    proteins_path: Option<&Utf8Path>,
    out_dir: &Utf8Path,
    options: &ExportOptions,
) -> Result<ExportItem, EbeyeError> {
    let record = load_record(px_path)?;
    let facts = load_facts(submission_path)?;
    let proteins = match proteins_path {
        Some(path) => load_proteins(path)?,
        None => BTreeMap::new(),
    };

    let document = ebeye::build_document(&record, &facts, &proteins, Utc::now().date_naive())?;

    if options.dry_run {
        return Ok(ExportItem {
            accession: record.accession.to_string(),
            action: "dry-run".to_string(),
            output_path: None,
        });
    }

    let output_path = write_document_atomic(out_dir, &record, &document)?;
    tracing::info!(
        accession = %record.accession,
        path = %output_path,
        "finished generating EB-eye XML"
    );

    Ok(ExportItem {
        accession: record.accession.to_string(),
        action: "written".to_string(),
        output_path: Some(output_path.to_string()),
    })
}

/// Batch export. A still-private project is skipped with a warning rather
/// than aborting the remaining datasets; every other error propagates.
pub fn export_all(
    config: &ResolvedConfig,
    out_override: Option<&Utf8Path>,
    options: &ExportOptions,
) -> Result<ExportResult, EbeyeError> {
    let out_dir = out_override.unwrap_or(&config.output_dir);
    let mut items = Vec::new();
    for dataset in &config.datasets {
        let item = export_entry(
            &dataset.px,
            &dataset.submission,
            dataset.proteins.as_deref(),
            out_dir,
            options,
        );
        match item {
            Ok(item) => items.push(item),
            Err(EbeyeError::ProjectNotPublic(accession)) => {
                tracing::warn!(%accession, "project is still private, skipping");
                items.push(ExportItem {
                    accession,
                    action: "skipped-private".to_string(),
                    output_path: None,
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(ExportResult { items })
}

pub fn inspect(px_path: &Utf8Path) -> Result<InspectResult, EbeyeError> {
    let record = load_record(px_path)?;
    Ok(InspectResult { record })
}

fn load_record(px_path: &Utf8Path) -> Result<ProjectRecord, EbeyeError> {
    let text = fs::read_to_string(px_path.as_std_path())
        .map_err(|_| EbeyeError::DescriptorRead(px_path.as_std_path().to_path_buf()))?;
    let doc = PxDocument::parse(&text)?;
    Ok(projector::project(&doc))
}

fn load_facts(submission_path: &Utf8Path) -> Result<SubmissionFacts, EbeyeError> {
    let text = fs::read_to_string(submission_path.as_std_path())
        .map_err(|_| EbeyeError::SubmissionRead(submission_path.as_std_path().to_path_buf()))?;
    SubmissionFacts::from_json(&text)
}

fn load_proteins(path: &Utf8Path) -> Result<BTreeMap<String, String>, EbeyeError> {
    let text = fs::read_to_string(path.as_std_path())
        .map_err(|_| EbeyeError::ProteinsRead(path.as_std_path().to_path_buf()))?;
    serde_json::from_str(&text).map_err(|err| EbeyeError::ProteinsParse(err.to_string()))
}

fn write_document_atomic(
    out_dir: &Utf8Path,
    record: &ProjectRecord,
    document: &xml::Element,
) -> Result<Utf8PathBuf, EbeyeError> {
    fs::create_dir_all(out_dir.as_std_path())
        .map_err(|err| EbeyeError::Filesystem(err.to_string()))?;

    let content = xml::to_xml_string(document)?;
    let target = out_dir.join(ebeye::output_file_name(&record.accession));

    let mut temp = tempfile::Builder::new()
        .prefix("pride-ebeye")
        .tempfile_in(out_dir.as_std_path())
        .map_err(|err| EbeyeError::Filesystem(err.to_string()))?;
    temp.write_all(content.as_bytes())
        .map_err(|err| EbeyeError::Filesystem(err.to_string()))?;
    temp.persist(target.as_std_path())
        .map_err(|err| EbeyeError::Filesystem(err.to_string()))?;

    Ok(target)
}
