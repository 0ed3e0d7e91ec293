//! EB-eye index document builder.
//!
//! Projects one [`ProjectRecord`] plus the submission facts and a protein
//! cross-reference map into the `database/entries/entry` tree consumed by
//! the EB-eye search catalog. Every recognized repeatable category always
//! yields at least one field: real entries when the source list is
//! populated, a single `Not available` sentinel otherwise, so consumers
//! never null-check for field presence.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{CvFact, DatasetAccession, Person, ProjectRecord};
use crate::error::EbeyeError;
use crate::submission::SubmissionFacts;
use crate::xml::Element;

pub const DATABASE_NAME: &str = "PRIDE Archive";
pub const DATABASE_RELEASE: &str = "3";

const NOT_AVAILABLE: &str = "Not available";
const OMICS_TYPE: &str = "Proteomics";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// File name pattern required by the EB-eye ingester.
pub fn output_file_name(accession: &DatasetAccession) -> String {
    format!("PRIDE_EBEYE_{accession}.xml")
}

/// Builds the index document for a public project. Refuses with
/// [`EbeyeError::ProjectNotPublic`] before touching anything when the
/// submission is still private; no partial tree is ever produced.
pub fn build_document(
    record: &ProjectRecord,
    facts: &SubmissionFacts,
    proteins: &BTreeMap<String, String>,
    generated_on: NaiveDate,
) -> Result<Element, EbeyeError> {
    if !facts.is_public {
        return Err(EbeyeError::ProjectNotPublic(record.accession.to_string()));
    }

    let mut database = Element::new("database");
    database.push(Element::with_text("name", DATABASE_NAME));
    database.push(Element::with_text("description", ""));
    database.push(Element::with_text("release", DATABASE_RELEASE));
    database.push(Element::with_text(
        "release_date",
        generated_on.format(DATE_FORMAT).to_string(),
    ));
    database.push(Element::with_text("entry_count", "1"));

    let mut entries = Element::new("entries");
    entries.push(build_entry(record, facts, proteins));
    database.push(entries);

    Ok(database)
}

fn build_entry(
    record: &ProjectRecord,
    facts: &SubmissionFacts,
    proteins: &BTreeMap<String, String>,
) -> Element {
    let mut entry = Element::new("entry").with_attribute("id", record.accession.as_str());

    entry.push(Element::with_text("name", record.title.clone()));
    let description = if record.description.is_empty() {
        record.title.clone()
    } else {
        record.description.clone()
    };
    entry.push(Element::with_text("description", description));

    entry.push(build_cross_references(record, facts, proteins));
    entry.push(build_dates(record, facts));
    entry.push(build_additional_fields(record, facts));

    entry
}

fn build_cross_references(
    record: &ProjectRecord,
    facts: &SubmissionFacts,
    proteins: &BTreeMap<String, String>,
) -> Element {
    let mut refs = Element::new("cross_references");

    for species in &facts.species {
        refs.push(
            Element::new("ref")
                .with_attribute("dbkey", species.accession.clone())
                .with_attribute("dbname", "TAXONOMY"),
        );
    }

    // References without a numeric PubMed id render as a publication field
    // only, never as a cross reference.
    for reference in &record.references {
        if let Some(pubmed_id) = reference.pubmed_id {
            refs.push(
                Element::new("ref")
                    .with_attribute("dbkey", pubmed_id.to_string())
                    .with_attribute("dbname", "pubmed"),
            );
        }
    }

    for (protein, database_name) in proteins {
        refs.push(
            Element::new("ref")
                .with_attribute("dbkey", protein.clone())
                .with_attribute("dbname", database_name.clone()),
        );
    }

    refs
}

fn build_dates(record: &ProjectRecord, facts: &SubmissionFacts) -> Element {
    let mut dates = Element::new("dates");

    let submission_date = facts
        .submission_date
        .unwrap_or_else(|| record.publication_date.date_naive());
    dates.push(
        Element::new("date")
            .with_attribute("value", submission_date.format(DATE_FORMAT).to_string())
            .with_attribute("type", "submission"),
    );
    dates.push(
        Element::new("date")
            .with_attribute(
                "value",
                record.publication_date.format(DATE_FORMAT).to_string(),
            )
            .with_attribute("type", "publication"),
    );

    dates
}

fn build_additional_fields(record: &ProjectRecord, facts: &SubmissionFacts) -> Element {
    let mut fields = Element::new("additional_fields");

    fields.push(text_field("omics_type", OMICS_TYPE));

    if let Some(protocol) = non_empty(facts.sample_protocol.as_deref()) {
        fields.push(text_field("sample_protocol", protocol));
    }
    if let Some(protocol) = non_empty(facts.data_protocol.as_deref()) {
        fields.push(text_field("data_protocol", protocol));
    }

    fields_or_sentinel(&mut fields, "instrument", &facts.instruments);
    fields_or_sentinel(&mut fields, "species", &facts.species);
    fields_or_sentinel(&mut fields, "cell_type", &facts.cell_types);
    fields_or_sentinel(&mut fields, "disease", &facts.diseases);
    fields_or_sentinel(&mut fields, "tissue", &facts.tissues);
    fields_or_sentinel(&mut fields, "modification", &record.ptms);
    fields_or_sentinel(&mut fields, "experiment_type", &record.experiment_types);

    for tag in &record.curator_tags {
        fields.push(text_field("curator_keywords", tag.as_str()));
    }
    if !record.submitter_keywords.is_empty() {
        fields.push(text_field(
            "submitter_keywords",
            record.submitter_keywords.join(", "),
        ));
    }

    fields_or_sentinel(&mut fields, "quantification_method", &facts.quantifications);
    fields.push(text_field(
        "submission_type",
        facts.submission_type.to_string(),
    ));
    fields_or_sentinel(&mut fields, "software", &facts.software);

    if let Some(doi) = non_empty(record.doi.as_deref()) {
        fields.push(text_field("doi", doi));
    }

    // Citation-less references contribute no publication field.
    for reference in &record.references {
        if let Some(citation) = &reference.citation {
            fields.push(text_field("publication", citation.as_str()));
        }
    }

    push_person_fields(&mut fields, &record.submitter);
    for lab_head in &record.lab_heads {
        push_person_fields(&mut fields, lab_head);
    }

    for location in &facts.data_files {
        fields.push(text_field("dataset_file", location.as_str()));
    }

    fields.push(text_field("dataset_link", record.dataset_link.as_str()));

    fields
}

/// Shared policy for every repeatable-fact category: one field per entry
/// carrying its display name, or a single sentinel field when the list is
/// empty.
fn fields_or_sentinel(parent: &mut Element, category: &str, entries: &[CvFact]) {
    if entries.is_empty() {
        parent.push(text_field(category, NOT_AVAILABLE));
        return;
    }
    for entry in entries {
        parent.push(text_field(category, entry.name.as_str()));
    }
}

/// Null person parts render as empty text, uniformly.
fn push_person_fields(parent: &mut Element, person: &Person) {
    parent.push(text_field(
        "submitter",
        person.first_name.as_deref().unwrap_or_default(),
    ));
    parent.push(text_field(
        "submitter_mail",
        person.email.as_deref().unwrap_or_default(),
    ));
    parent.push(text_field(
        "submitter_affiliation",
        person.affiliation.as_deref().unwrap_or_default(),
    ));
}

fn text_field(name: &str, text: impl Into<String>) -> Element {
    Element::with_text("field", text).with_attribute("name", name)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use crate::domain::Reference;

    use super::*;

    fn record() -> ProjectRecord {
        ProjectRecord {
            accession: "PXD000001".parse().unwrap(),
            repository_name: "PRIDE".to_string(),
            title: "Test dataset".to_string(),
            description: String::new(),
            instruments: Vec::new(),
            ptms: Vec::new(),
            species: Vec::new(),
            taxonomy_ids: Vec::new(),
            submitter: Person::default(),
            lab_heads: Vec::new(),
            publication_date: Utc.with_ymd_and_hms(2012, 3, 8, 0, 0, 0).unwrap(),
            data_file_names: Vec::new(),
            submitter_keywords: Vec::new(),
            curator_tags: Vec::new(),
            review_level: String::new(),
            dataset_link: "http://example.org/PXD000001".to_string(),
            experiment_types: Vec::new(),
            references: Vec::new(),
            doi: None,
        }
    }

    fn facts() -> SubmissionFacts {
        SubmissionFacts::from_json(r#"{"is_public": true}"#).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 2, 10).unwrap()
    }

    fn named_fields<'a>(entry: &'a Element, name: &str) -> Vec<&'a Element> {
        entry
            .child("additional_fields")
            .expect("additional_fields")
            .children_named("field")
            .filter(|field| field.attribute("name") == Some(name))
            .collect()
    }

    #[test]
    fn private_project_is_refused() {
        let facts = SubmissionFacts::from_json(r#"{"is_public": false}"#).unwrap();
        let err = build_document(&record(), &facts, &BTreeMap::new(), today()).unwrap_err();
        assert_matches!(err, EbeyeError::ProjectNotPublic(accession) if accession == "PXD000001");
    }

    #[test]
    fn empty_instrument_list_yields_single_sentinel() {
        let document = build_document(&record(), &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        let instruments = named_fields(entry, "instrument");
        assert_eq!(instruments.len(), 1);
        assert_eq!(instruments[0].text.as_deref(), Some("Not available"));
    }

    #[test]
    fn description_falls_back_to_title() {
        let document = build_document(&record(), &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        assert_eq!(
            entry.child("description").unwrap().text.as_deref(),
            Some("Test dataset")
        );
    }

    #[test]
    fn pubmed_references_produce_cross_reference_and_field() {
        let mut record = record();
        record.references = vec![
            Reference {
                pubmed_id: Some(23203882),
                citation: Some("Doe J, et al.".to_string()),
            },
            Reference {
                pubmed_id: None,
                citation: Some("Roe R, et al.".to_string()),
            },
        ];
        let document = build_document(&record, &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();

        let pubmed_refs: Vec<_> = entry
            .child("cross_references")
            .unwrap()
            .children_named("ref")
            .filter(|r| r.attribute("dbname") == Some("pubmed"))
            .collect();
        assert_eq!(pubmed_refs.len(), 1);
        assert_eq!(pubmed_refs[0].attribute("dbkey"), Some("23203882"));

        assert_eq!(named_fields(entry, "publication").len(), 2);
    }

    #[test]
    fn citation_less_reference_emits_no_publication_field() {
        let mut record = record();
        record.references = vec![Reference {
            pubmed_id: Some(12345),
            citation: None,
        }];
        let document = build_document(&record, &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        assert!(named_fields(entry, "publication").is_empty());
    }

    #[test]
    fn protein_map_renders_in_key_order() {
        let mut proteins = BTreeMap::new();
        proteins.insert("P12345".to_string(), "uniprot".to_string());
        proteins.insert("ENSP00000354587".to_string(), "ensembl".to_string());
        let document = build_document(&record(), &facts(), &proteins, today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        let refs: Vec<_> = entry
            .child("cross_references")
            .unwrap()
            .children_named("ref")
            .collect();
        assert_eq!(refs[0].attribute("dbkey"), Some("ENSP00000354587"));
        assert_eq!(refs[1].attribute("dbkey"), Some("P12345"));
    }

    #[test]
    fn submission_date_falls_back_to_publication_date() {
        let document = build_document(&record(), &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        let dates: Vec<_> = entry.child("dates").unwrap().children_named("date").collect();
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].attribute("type"), Some("submission"));
        assert_eq!(dates[0].attribute("value"), Some("2012-03-08"));
        assert_eq!(dates[1].attribute("type"), Some("publication"));
        assert_eq!(dates[1].attribute("value"), Some("2012-03-08"));
    }

    #[test]
    fn empty_submitter_renders_empty_triple() {
        let document = build_document(&record(), &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        let names = named_fields(entry, "submitter");
        let mails = named_fields(entry, "submitter_mail");
        let affiliations = named_fields(entry, "submitter_affiliation");
        assert_eq!(names.len(), 1);
        assert_eq!(mails.len(), 1);
        assert_eq!(affiliations.len(), 1);
        assert_eq!(names[0].text.as_deref(), Some(""));
    }

    #[test]
    fn lab_heads_render_one_triple_each() {
        let mut record = record();
        record.lab_heads = vec![
            Person {
                first_name: Some("PI One".to_string()),
                email: Some("one@lab.org".to_string()),
                affiliation: Some("Lab One".to_string()),
            },
            Person {
                first_name: Some("PI Two".to_string()),
                email: None,
                affiliation: None,
            },
        ];
        let document = build_document(&record, &facts(), &BTreeMap::new(), today()).unwrap();
        let entry = document.child("entries").unwrap().child("entry").unwrap();
        // submitter triple plus one per lab head
        assert_eq!(named_fields(entry, "submitter").len(), 3);
        assert_eq!(named_fields(entry, "submitter_mail").len(), 3);
    }

    #[test]
    fn output_file_name_follows_fixed_pattern() {
        let accession: DatasetAccession = "PXD000001".parse().unwrap();
        assert_eq!(output_file_name(&accession), "PRIDE_EBEYE_PXD000001.xml");
    }
}
