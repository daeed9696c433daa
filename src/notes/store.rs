//! RecordStore trait defining the lookups the search engine needs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::record::{Field, Record};
use crate::error::ServiceError;

/// A record that matched a substring lookup, tagged with the field that hit.
#[derive(Debug, Clone)]
pub struct FieldMatch {
    pub record: Record,
    pub field: Field,
}

/// Trait defining the read-only queries served by a notes collection.
///
/// Implementations include:
/// - `MockStore` - Built-in sample notes for testing
/// - `MemoryStore` - Snapshot loaded from a notes file
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records whose `field` equals `value`, ignoring case.
    async fn find_exact_field(&self, field: Field, value: &str)
        -> Result<Vec<Record>, ServiceError>;

    /// One entry per (record, field) where the field contains `value`,
    /// ignoring case.
    ///
    /// Entries are ordered field-major: every hit for `fields[0]` in record
    /// order, then every hit for `fields[1]`, and so on.
    async fn find_substring_any_field(
        &self,
        fields: &[Field],
        value: &str,
    ) -> Result<Vec<FieldMatch>, ServiceError>;

    /// Up to `cap` records with exactly this semester and branch.
    async fn find_by_pair(
        &self,
        semester: &str,
        branch: &str,
        cap: usize,
    ) -> Result<Vec<Record>, ServiceError>;

    /// Sorted distinct branch names offered in `semester`.
    async fn distinct_branches(&self, semester: &str) -> Result<Vec<String>, ServiceError>;

    /// Total number of records.
    fn count(&self) -> usize;

    /// Where the records were loaded from.
    fn source(&self) -> &str;

    /// Check if the store is ready to serve queries.
    fn is_ready(&self) -> bool;

    /// When the current snapshot was loaded, if the store tracks it.
    fn loaded_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}
