//! Note file import and sync.
//!
//! A notes file is JSON in one of three shapes:
//! - legacy map: `{"BCS301 - Data Structures": "/Sem3/cse"}`
//! - record list: `[{"subject_code": ..., "subject_name": ..., "branch_url": ...}]`
//! - source documents: `{"documents": [{"subject": "Name (CODE1/CODE2)", "sem": ..., "department": [...]}]}`

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::notes::Record;

/// Errors raised while reading a notes file.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported notes file layout: {0}")]
    UnsupportedShape(&'static str),

    #[error("Entry {0} has no branch_url")]
    MissingBranchUrl(usize),

    #[error("Entry '{0}' must map to a branch URL string")]
    InvalidLegacyEntry(String),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    subject_code: Option<String>,
    #[serde(default)]
    subject_name: Option<String>,
    #[serde(default, alias = "drive_link")]
    branch_url: Option<String>,
    #[serde(default)]
    semester: Option<String>,
    #[serde(default)]
    branch: Option<String>,
}

/// A document from the upstream notes catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sem: String,
    #[serde(default)]
    pub department: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SourceFile {
    documents: Vec<SourceDocument>,
}

/// Parse a notes file, detecting which layout it uses.
pub fn parse_notes(json: &str) -> Result<Vec<Record>, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    if value.get("documents").is_some() {
        let file: SourceFile = serde_json::from_value(value)?;
        return Ok(from_source_documents(&file.documents));
    }

    match value {
        Value::Array(items) => parse_record_list(items),
        Value::Object(map) => {
            let mut records = Vec::with_capacity(map.len());
            for (full_name, url) in map {
                let Value::String(url) = url else {
                    return Err(ImportError::InvalidLegacyEntry(full_name));
                };
                records.push(from_legacy_entry(&full_name, &url));
            }
            Ok(records)
        }
        _ => Err(ImportError::UnsupportedShape("expected a JSON object or array")),
    }
}

fn parse_record_list(items: Vec<Value>) -> Result<Vec<Record>, ImportError> {
    let raw: Vec<RawRecord> = serde_json::from_value(Value::Array(items))?;
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| {
            let branch_url = r.branch_url.ok_or(ImportError::MissingBranchUrl(i))?;
            Ok(Record::new(
                r.subject_code.unwrap_or_default(),
                r.subject_name.unwrap_or_default(),
                branch_url,
                r.semester.unwrap_or_default(),
                r.branch.unwrap_or_default(),
            ))
        })
        .collect()
}

/// Split a `"CODE - Name"` key into a record with no semester or branch.
pub fn from_legacy_entry(full_name: &str, branch_url: &str) -> Record {
    let (code, name) = match full_name.split_once(" - ") {
        Some((code, name)) => (code.trim(), name.trim()),
        None => ("", full_name),
    };
    Record::new(code, name, branch_url, "", "")
}

/// Split `"Name (CODE1/CODE2)"` into `(code, name)`, taking the first code.
pub fn split_subject(subject: &str) -> (String, String) {
    if let (Some(open), true) = (subject.find('('), subject.contains(')')) {
        let name = subject[..open].trim();
        let inner = &subject[open + 1..];
        let codes = inner.split(')').next().unwrap_or_default();
        let code = codes.split('/').next().unwrap_or_default().trim();
        (code.to_string(), name.to_string())
    } else {
        (String::new(), subject.to_string())
    }
}

/// One record per department of every document, linked at `/{sem}/{dept}`.
pub fn from_source_documents(documents: &[SourceDocument]) -> Vec<Record> {
    let mut records = Vec::new();
    for doc in documents {
        let (code, name) = split_subject(&doc.subject);
        for dept in &doc.department {
            records.push(Record::new(
                code.clone(),
                name.clone(),
                format!("/{}/{}", doc.sem, dept),
                doc.sem.clone(),
                dept.clone(),
            ));
        }
    }
    debug!(
        documents = documents.len(),
        records = records.len(),
        "Expanded source documents"
    );
    records
}

/// Outcome of merging an incoming batch into an existing collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub new_notes: usize,
    pub existing_notes: usize,
    pub total_source: usize,
}

/// Append `incoming` records to `existing`, skipping any identity already present.
pub fn sync(existing: &mut Vec<Record>, incoming: Vec<Record>) -> SyncReport {
    let total_source = incoming.len();
    let mut seen: HashSet<(String, String, String, String)> =
        existing.iter().map(owned_identity).collect();

    let mut report = SyncReport {
        total_source,
        ..Default::default()
    };

    for record in incoming {
        if seen.insert(owned_identity(&record)) {
            existing.push(record);
            report.new_notes += 1;
        } else {
            report.existing_notes += 1;
        }
    }

    info!(
        new_notes = report.new_notes,
        existing_notes = report.existing_notes,
        total_source = report.total_source,
        "Notes sync finished"
    );
    report
}

fn owned_identity(record: &Record) -> (String, String, String, String) {
    let (code, name, semester, branch) = record.identity();
    (
        code.to_string(),
        name.to_string(),
        semester.to_string(),
        branch.to_string(),
    )
}
