//! Mock record store serving built-in sample notes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::memory::MemoryStore;
use super::record::{Field, Record};
use super::store::{FieldMatch, RecordStore};
use crate::error::ServiceError;

/// Mock store that serves a fixed sample catalogue.
///
/// This implementation lets the service run without a notes file.
pub struct MockStore {
    inner: MemoryStore,
}

impl MockStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        info!("Initializing MockStore with sample notes");
        Self {
            inner: MemoryStore::from_records(sample_records(), "mock://sample-notes.json"),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample catalogue spanning the cycle semesters and Sem3..Sem6.
pub fn sample_records() -> Vec<Record> {
    let data: &[(&str, &str, &str, &[&str])] = &[
        ("BMATS101", "Mathematics for CSE Stream-I", "Chemistrycycle", &["computerscience", "aiml"]),
        ("BCHES102", "Applied Chemistry for CSE Stream", "Chemistrycycle", &["computerscience", "aiml"]),
        ("BPOPS103", "Principles of Programming Using C", "Chemistrycycle", &["computerscience", "aiml"]),
        ("BMATS201", "Mathematics for CSE Stream-II", "Physicscycle", &["computerscience", "aiml"]),
        ("BPHYS202", "Applied Physics for CSE Stream", "Physicscycle", &["computerscience", "aiml"]),
        ("BCS301", "Mathematics for Computer Science", "Sem3", &["computerscience", "informationscience"]),
        ("BCS302", "Digital Design and Computer Organization", "Sem3", &["computerscience", "informationscience"]),
        ("BCS303", "Operating Systems", "Sem3", &["computerscience", "informationscience", "aiml"]),
        ("BCS304", "Data Structures and Applications", "Sem3", &["computerscience", "informationscience", "aiml"]),
        ("BEC302", "Digital System Design using Verilog", "Sem3", &["electronicsandcommunications"]),
        ("BEC303", "Electronic Principles and Circuits", "Sem3", &["electronicsandcommunications"]),
        ("BCS401", "Analysis and Design of Algorithms", "Sem4", &["computerscience", "aiml"]),
        ("BCS402", "Microcontrollers", "Sem4", &["computerscience", "aiml"]),
        ("BCS403", "Database Management Systems", "Sem4", &["computerscience", "informationscience"]),
        ("BAD402", "Artificial Intelligence", "Sem4", &["aiml", "aids"]),
        ("BCS501", "Software Engineering and Project Management", "Sem5", &["computerscience"]),
        ("BCS502", "Computer Networks", "Sem5", &["computerscience", "informationscience"]),
        ("BCS503", "Theory of Computation", "Sem5", &["computerscience"]),
        ("BAI501", "Data Mining and Data Warehousing", "Sem5", &["aiml", "aids"]),
        ("BCS601", "Cloud Computing", "Sem6", &["computerscience"]),
        ("BCS602", "Machine Learning", "Sem6", &["computerscience", "aiml"]),
        ("", "Indian Knowledge System", "Sem6", &["computerscience"]),
    ];

    data.iter()
        .flat_map(|(code, name, semester, branches)| {
            branches.iter().map(move |branch| {
                Record::new(
                    *code,
                    *name,
                    format!("/{}/{}", semester, branch),
                    *semester,
                    *branch,
                )
            })
        })
        .collect()
}

#[async_trait]
impl RecordStore for MockStore {
    async fn find_exact_field(
        &self,
        field: Field,
        value: &str,
    ) -> Result<Vec<Record>, ServiceError> {
        self.inner.find_exact_field(field, value).await
    }

    async fn find_substring_any_field(
        &self,
        fields: &[Field],
        value: &str,
    ) -> Result<Vec<FieldMatch>, ServiceError> {
        self.inner.find_substring_any_field(fields, value).await
    }

    async fn find_by_pair(
        &self,
        semester: &str,
        branch: &str,
        cap: usize,
    ) -> Result<Vec<Record>, ServiceError> {
        self.inner.find_by_pair(semester, branch, cap).await
    }

    async fn distinct_branches(&self, semester: &str) -> Result<Vec<String>, ServiceError> {
        self.inner.distinct_branches(semester).await
    }

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn source(&self) -> &str {
        self.inner.source()
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.inner.loaded_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_records_expand_branches() {
        let records = sample_records();
        let ds: Vec<_> = records
            .iter()
            .filter(|r| r.subject_code() == "BCS304")
            .collect();
        assert_eq!(ds.len(), 3);
        assert!(ds.iter().any(|r| r.branch_url() == "/Sem3/aiml"));
    }

    #[test]
    fn test_source_is_mock() {
        let store = MockStore::new();
        assert!(store.source().starts_with("mock://"));
        assert!(store.count() > 20);
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_distinct_branches_for_sem3() {
        let store = MockStore::new();
        let branches = store.distinct_branches("Sem3").await.unwrap();
        assert_eq!(
            branches,
            vec![
                "aiml".to_string(),
                "computerscience".to_string(),
                "electronicsandcommunications".to_string(),
                "informationscience".to_string(),
            ]
        );
    }
}
