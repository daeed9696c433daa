//! In-memory record store backed by a notes file snapshot.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::record::{Field, Record};
use super::store::{FieldMatch, RecordStore};
use crate::error::ServiceError;
use crate::import;

/// Immutable snapshot of records served from memory.
///
/// Lowercased copies of each searchable field are computed once at load so
/// that lookups only lowercase the query.
pub struct MemoryStore {
    records: Arc<Vec<Record>>,
    folded: Vec<[String; 5]>,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("source", &self.source)
            .field("count", &self.records.len())
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Build a store over already-constructed records.
    pub fn from_records(records: Vec<Record>, source: impl Into<String>) -> Self {
        let folded = records
            .iter()
            .map(|r| Field::SEARCHABLE.map(|f| r.field(f).to_lowercase()))
            .collect();
        Self {
            records: Arc::new(records),
            folded,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Load a notes file in any supported layout.
    ///
    /// Entries repeating an earlier identity are dropped.
    ///
    /// # Errors
    /// Returns error if:
    /// - File doesn't exist
    /// - File can't be read or parsed
    pub async fn open(file_path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let file_path: PathBuf = file_path.as_ref().to_path_buf();

        info!(path = %file_path.display(), "Loading notes file");

        if !file_path.exists() {
            error!(path = %file_path.display(), "Notes file not found");
            return Err(ServiceError::NotesFileNotFound(
                file_path.display().to_string(),
            ));
        }

        let parsed = tokio::task::spawn_blocking({
            let file_path = file_path.clone();
            move || -> Result<Vec<Record>, ServiceError> {
                let contents = std::fs::read_to_string(&file_path)
                    .map_err(|e| ServiceError::NotesLoadError(e.to_string()))?;
                import::parse_notes(&contents)
                    .map_err(|e| ServiceError::NotesLoadError(e.to_string()))
            }
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to spawn blocking task");
            ServiceError::Internal(format!("Task error: {}", e))
        })?
        .map_err(|e| {
            error!(error = %e, "Failed to load notes file");
            e
        })?;

        let mut records = Vec::with_capacity(parsed.len());
        let report = import::sync(&mut records, parsed);

        info!(
            path = %file_path.display(),
            count = records.len(),
            duplicates = report.existing_notes,
            "Notes file loaded successfully"
        );

        Ok(Self::from_records(
            records,
            file_path.display().to_string(),
        ))
    }

    fn slot(field: Field) -> usize {
        match field {
            Field::SubjectCode => 0,
            Field::SubjectName => 1,
            Field::FullName => 2,
            Field::Semester => 3,
            Field::Branch => 4,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_exact_field(
        &self,
        field: Field,
        value: &str,
    ) -> Result<Vec<Record>, ServiceError> {
        let needle = value.to_lowercase();
        let slot = Self::slot(field);
        Ok(self
            .records
            .iter()
            .zip(&self.folded)
            .filter(|(_, folded)| folded[slot] == needle)
            .map(|(r, _)| r.clone())
            .collect())
    }

    async fn find_substring_any_field(
        &self,
        fields: &[Field],
        value: &str,
    ) -> Result<Vec<FieldMatch>, ServiceError> {
        let needle = value.to_lowercase();
        let mut matches = Vec::new();
        for &field in fields {
            let slot = Self::slot(field);
            matches.extend(
                self.records
                    .iter()
                    .zip(&self.folded)
                    .filter(|(_, folded)| folded[slot].contains(&needle))
                    .map(|(r, _)| FieldMatch {
                        record: r.clone(),
                        field,
                    }),
            );
        }
        Ok(matches)
    }

    async fn find_by_pair(
        &self,
        semester: &str,
        branch: &str,
        cap: usize,
    ) -> Result<Vec<Record>, ServiceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.semester() == semester && r.branch() == branch)
            .take(cap)
            .cloned()
            .collect())
    }

    async fn distinct_branches(&self, semester: &str) -> Result<Vec<String>, ServiceError> {
        let branches: BTreeSet<&str> = self
            .records
            .iter()
            .filter(|r| r.semester() == semester && !r.branch().is_empty())
            .map(|r| r.branch())
            .collect();
        Ok(branches.into_iter().map(String::from).collect())
    }

    fn count(&self) -> usize {
        self.records.len()
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn is_ready(&self) -> bool {
        !self.records.is_empty()
    }

    fn loaded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.loaded_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn store() -> MemoryStore {
        MemoryStore::from_records(
            vec![
                Record::new("BCS301", "Data Structures", "/Sem3/cse", "Sem3", "cse"),
                Record::new("BCS302", "Digital Design", "/Sem3/cse", "Sem3", "cse"),
                Record::new("BEC301", "Data Communication", "/Sem3/ece", "Sem3", "ece"),
                Record::new("BCS401", "Algorithms", "/Sem4/cse", "Sem4", "cse"),
            ],
            "test",
        )
    }

    #[tokio::test]
    async fn test_find_exact_field_ignores_case() {
        let hits = store()
            .find_exact_field(Field::SubjectCode, "bcs301")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].subject_name(), "Data Structures");
    }

    #[tokio::test]
    async fn test_find_exact_field_is_full_string() {
        let hits = store()
            .find_exact_field(Field::SubjectCode, "bcs30")
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_substring_matches_are_field_major() {
        let hits = store()
            .find_substring_any_field(&Field::SEARCHABLE, "d")
            .await
            .unwrap();

        // "d" is in code of nothing, names "Data Structures", "Digital Design",
        // "Data Communication", then the same three full names.
        let fields: Vec<Field> = hits.iter().map(|m| m.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::SubjectName,
                Field::SubjectName,
                Field::SubjectName,
                Field::FullName,
                Field::FullName,
                Field::FullName,
            ]
        );
    }

    #[tokio::test]
    async fn test_find_by_pair_respects_cap() {
        let hits = store().find_by_pair("Sem3", "cse", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].subject_code(), "BCS301");
    }

    #[tokio::test]
    async fn test_distinct_branches_sorted() {
        let branches = store().distinct_branches("Sem3").await.unwrap();
        assert_eq!(branches, vec!["cse".to_string(), "ece".to_string()]);
        assert!(store().distinct_branches("Sem8").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = MemoryStore::open("/nonexistent/notes.json").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotesFileNotFound(_)));
    }

    #[tokio::test]
    async fn test_open_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = MemoryStore::open(file.path()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotesLoadError(_)));
    }

    #[tokio::test]
    async fn test_open_legacy_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"18CS51 - Management": "/Sem5/cs"}}"#).unwrap();

        let store = MemoryStore::open(file.path()).await.unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.is_ready());
        assert_eq!(store.source(), file.path().display().to_string());
        assert!(store.loaded_at().is_some());
    }

    #[tokio::test]
    async fn test_open_drops_repeated_identities() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"subject_code": "BCS303", "subject_name": "Operating Systems", "branch_url": "/Sem3/cse", "semester": "Sem3", "branch": "cse"}},
                {{"subject_code": "BCS303", "subject_name": "Operating Systems", "branch_url": "/Sem3/cse", "semester": "Sem3", "branch": "cse"}},
                {{"subject_code": "BCS303", "subject_name": "Operating Systems", "branch_url": "/Sem3/aiml", "semester": "Sem3", "branch": "aiml"}}
            ]"#
        )
        .unwrap();

        let store = MemoryStore::open(file.path()).await.unwrap();
        assert_eq!(store.count(), 2);
        let hits = store
            .find_exact_field(Field::SubjectCode, "bcs303")
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_store_is_not_ready() {
        let empty = MemoryStore::from_records(Vec::new(), "empty");
        assert!(!empty.is_ready());
        assert!(store().is_ready());
    }
}
