//! Projection of a parsed PX descriptor into a normalized [`ProjectRecord`].
//!
//! Every rule is a pure scan over the descriptor's field lists keyed by the
//! [`CvCode`] table. Missing optional data never raises; each rule resolves
//! to a defined fallback (empty person, empty list, canonical link, dropped
//! entry) so heterogeneous submissions always project to a usable record.

use chrono::NaiveTime;

use crate::domain::{CvFact, Person, ProjectRecord, Reference};
use crate::px::{
    ContactEntry, CvTerm, DatasetFileEntry, DatasetLinkEntry, PublicationEntry, PxDocument,
    SpeciesEntry,
};
use crate::vocab::{CvCode, SRM_EXPERIMENT_ACCESSION, SRM_EXPERIMENT_NAME, SRM_MARKER};

pub fn project(doc: &PxDocument) -> ProjectRecord {
    let (species, taxonomy_ids) = split_species(&doc.species);
    let (submitter_keywords, mut curator_tags) = partition_keywords(&doc.keywords);
    if !doc.review_level.is_empty() {
        curator_tags.push(doc.review_level.clone());
    }

    let dataset_link = resolve_dataset_link(&doc.dataset_links)
        .unwrap_or_else(|| doc.accession.canonical_dataset_url());

    ProjectRecord {
        accession: doc.accession.clone(),
        repository_name: doc.repository_name.clone(),
        title: doc.title.clone(),
        description: doc.description.clone(),
        instruments: doc
            .instruments
            .iter()
            .flat_map(|instrument| to_facts(&instrument.terms))
            .collect(),
        ptms: to_facts(&doc.ptms),
        species,
        taxonomy_ids,
        submitter: select_submitter(&doc.contacts),
        lab_heads: select_lab_heads(&doc.contacts),
        publication_date: doc.announce_date.and_time(NaiveTime::MIN).and_utc(),
        data_file_names: file_names(&doc.data_files),
        submitter_keywords,
        curator_tags,
        review_level: doc.review_level.clone(),
        dataset_link,
        experiment_types: synthesize_experiment_types(&doc.keywords),
        references: extract_references(&doc.publications),
        doi: extract_doi(&doc.identifiers),
    }
}

fn to_fact(term: &CvTerm) -> CvFact {
    CvFact {
        accession: term.accession.clone(),
        name: term.name.clone(),
        unit: term.unit.clone(),
        value: term.value.clone(),
    }
}

fn to_facts(terms: &[CvTerm]) -> Vec<CvFact> {
    terms.iter().map(to_fact).collect()
}

/// First contact in document order carrying the submitter-role term; an
/// empty person when none qualifies.
fn select_submitter(contacts: &[ContactEntry]) -> Person {
    contacts
        .iter()
        .find(|contact| {
            contact
                .terms
                .iter()
                .any(|term| CvCode::DatasetSubmitter.matches(&term.accession))
        })
        .map(terms_to_person)
        .unwrap_or_default()
}

/// One person per lab-head-role term occurrence, in document order. A
/// contact tagged twice appears twice.
fn select_lab_heads(contacts: &[ContactEntry]) -> Vec<Person> {
    let mut heads = Vec::new();
    for contact in contacts {
        for term in &contact.terms {
            if CvCode::LabHead.matches(&term.accession) {
                heads.push(terms_to_person(contact));
            }
        }
    }
    heads
}

fn terms_to_person(contact: &ContactEntry) -> Person {
    let mut person = Person::default();
    for term in &contact.terms {
        if CvCode::ContactName.matches(&term.accession) {
            person.first_name = term.value.clone();
        }
        if CvCode::ContactEmail.matches(&term.accession) {
            person.email = term.value.clone();
        }
        if CvCode::ContactAffiliation.matches(&term.accession) {
            person.affiliation = term.value.clone();
        }
    }
    person
}

/// Single scan per species block: taxonomy terms contribute their value to
/// the id list, every other term becomes a species fact. A term never lands
/// in both outputs.
fn split_species(species: &[SpeciesEntry]) -> (Vec<CvFact>, Vec<String>) {
    let mut facts = Vec::new();
    let mut taxonomy_ids = Vec::new();
    for entry in species {
        for term in &entry.terms {
            if CvCode::NcbiTaxonomy.matches(&term.accession) {
                if let Some(value) = &term.value {
                    taxonomy_ids.push(value.clone());
                }
            } else {
                facts.push(to_fact(term));
            }
        }
    }
    (facts, taxonomy_ids)
}

/// Partition the raw keyword list by the two disjoint key codes. Terms
/// matching neither are dropped.
fn partition_keywords(keywords: &[CvTerm]) -> (Vec<String>, Vec<String>) {
    let submitter = keywords
        .iter()
        .filter(|term| CvCode::SubmitterKeyword.matches(&term.accession))
        .filter_map(|term| term.value.clone())
        .collect();
    let curator = keywords
        .iter()
        .filter(|term| CvCode::CuratorKeyword.matches(&term.accession))
        .filter_map(|term| term.value.clone())
        .collect();
    (submitter, curator)
}

/// Synthesizes one targeted-quantitation fact per keyword term mentioning
/// SRM, in its value or its display name. Duplicates across multiple
/// matching terms are preserved.
fn synthesize_experiment_types(keywords: &[CvTerm]) -> Vec<CvFact> {
    let mut types = Vec::new();
    for term in keywords {
        let value_hit = term
            .value
            .as_deref()
            .is_some_and(|value| value.contains(SRM_MARKER));
        if value_hit || term.name.contains(SRM_MARKER) {
            types.push(CvFact::new(
                SRM_EXPERIMENT_ACCESSION,
                SRM_EXPERIMENT_NAME,
                None,
                Some(SRM_EXPERIMENT_NAME.to_string()),
            ));
        }
    }
    types
}

/// Value of the first repository-hosted link (MassIVE or PASSEL). The
/// caller substitutes the canonical ProteomeCentral URL when this is None.
fn resolve_dataset_link(links: &[DatasetLinkEntry]) -> Option<String> {
    links
        .iter()
        .find(|link| {
            CvCode::MassiveDatasetUri.matches(&link.term.accession)
                || CvCode::PasselExperimentUri.matches(&link.term.accession)
        })
        .and_then(|link| link.term.value.clone())
}

/// PubMed terms with a non-empty all-digit value set the id; every other
/// term overwrites the citation text (last one wins, even when its value is
/// absent). Entries with neither field are dropped.
fn extract_references(publications: &[PublicationEntry]) -> Vec<Reference> {
    let mut references = Vec::new();
    for publication in publications {
        let mut pubmed_id = None;
        let mut citation = None;
        for term in &publication.terms {
            if CvCode::Pubmed.matches(&term.accession) {
                pubmed_id = parse_pubmed_id(term.value.as_deref()).or(pubmed_id);
            } else {
                citation = term.value.clone();
            }
        }
        if pubmed_id.is_some() || citation.is_some() {
            references.push(Reference { pubmed_id, citation });
        }
    }
    references
}

fn parse_pubmed_id(value: Option<&str>) -> Option<u32> {
    let value = value?;
    if value.is_empty() || !value.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn file_names(files: &[DatasetFileEntry]) -> Vec<String> {
    files
        .iter()
        .flat_map(|file| file.terms.iter().filter_map(|term| term.value.clone()))
        .collect()
}

fn extract_doi(identifiers: &[CvTerm]) -> Option<String> {
    identifiers
        .iter()
        .find(|term| CvCode::Doi.matches(&term.accession))
        .and_then(|term| term.value.clone())
}
