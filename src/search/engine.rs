//! Tiered search over a record store.
//!
//! Tiers are tried in order and the first one with a match wins:
//! 1. exact subject code
//! 2. exact subject name
//! 3. scored substring match over code, name, full name, semester and branch
//! 4. related notes from the semester and branch of an anchor record
//! 5. none

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::grouping::{group_by_branch, BucketEntry, PARTIAL_DISPLAY_CAP};
use super::result::{
    ExactHit, ExactResult, MatchType, NoneResult, PartialResult, RelatedResult, SearchResult,
};
use super::scoring::rank;
use crate::error::ServiceError;
use crate::notes::{Field, Record, RecordStore};

/// Records fetched for a related-notes result.
pub const RELATED_CAP: usize = 20;
/// Shortest query word tried when looking for a related-notes anchor.
pub const ANCHOR_MIN_WORD_LEN: usize = 3;

/// Lowercase and trim a raw query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Stateless search over an injected record store.
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn RecordStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Run the tier cascade for `query`, returning at most `limit` matches.
    ///
    /// # Errors
    /// - `InvalidQuery` when the query is blank
    /// - whatever the store returns when a lookup fails
    #[instrument(skip(self), fields(tier))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResult, ServiceError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Err(ServiceError::InvalidQuery("Query cannot be empty".into()));
        }
        let limit = limit.max(1);

        let result = match self.exact(query, &normalized, limit).await? {
            Some(exact) => exact,
            None => match self.partial(query, &normalized, limit).await? {
                Some(partial) => partial,
                None => self.related(query, &normalized).await?,
            },
        };

        tracing::Span::current().record("tier", result.tier().as_str());
        info!(query = %query, tier = result.tier().as_str(), "Search completed");
        Ok(result)
    }

    async fn exact(
        &self,
        query: &str,
        normalized: &str,
        limit: usize,
    ) -> Result<Option<SearchResult>, ServiceError> {
        let tiers = [
            (Field::SubjectCode, MatchType::ExactCode),
            (Field::SubjectName, MatchType::ExactName),
        ];

        for (field, match_type) in tiers {
            let mut records = self.store.find_exact_field(field, normalized).await?;
            if records.is_empty() {
                continue;
            }
            records.truncate(limit);
            debug!(field = %field, hits = records.len(), "Exact match");
            let results = records
                .into_iter()
                .map(|record| ExactHit { record, match_type })
                .collect();
            return Ok(Some(SearchResult::Exact(ExactResult {
                query: query.to_string(),
                match_type,
                results,
            })));
        }
        Ok(None)
    }

    async fn partial(
        &self,
        query: &str,
        normalized: &str,
        limit: usize,
    ) -> Result<Option<SearchResult>, ServiceError> {
        let matches = self
            .store
            .find_substring_any_field(&Field::SEARCHABLE, normalized)
            .await?;
        if matches.is_empty() {
            return Ok(None);
        }

        let mut ranked = rank(matches, normalized);
        let total_matches = ranked.len();
        ranked.truncate(limit);

        let mut buckets = group_by_branch(
            ranked.iter().map(|m| BucketEntry {
                record: &m.record,
                score: Some(m.score),
                matched_field: Some(m.field),
            }),
            PARTIAL_DISPLAY_CAP,
        );
        buckets.sort_by(|a, b| b.best_score.cmp(&a.best_score));

        debug!(
            total_matches,
            buckets = buckets.len(),
            "Partial match"
        );
        Ok(Some(SearchResult::Partial(PartialResult {
            query: query.to_string(),
            buckets,
            total_matches,
        })))
    }

    async fn related(&self, query: &str, normalized: &str) -> Result<SearchResult, ServiceError> {
        let Some(anchor) = self.find_anchor(normalized).await? else {
            return Ok(SearchResult::None(NoneResult {
                query: query.to_string(),
            }));
        };

        let results = self
            .store
            .find_by_pair(anchor.semester(), anchor.branch(), RELATED_CAP)
            .await?;
        debug!(
            semester = anchor.semester(),
            branch = anchor.branch(),
            related = results.len(),
            "Related notes"
        );
        Ok(SearchResult::Related(RelatedResult {
            query: query.to_string(),
            results,
            searched_semester: anchor.semester().to_string(),
            searched_branch: anchor.branch().to_string(),
        }))
    }

    /// First record hit by any word of a multi-word query.
    ///
    /// The whole query has already missed in the partial tier, so only its
    /// individual words are tried here, in query order.
    async fn find_anchor(&self, normalized: &str) -> Result<Option<Record>, ServiceError> {
        let words: Vec<&str> = normalized.split_whitespace().collect();
        if words.len() < 2 {
            return Ok(None);
        }

        for word in words {
            if word.chars().count() < ANCHOR_MIN_WORD_LEN {
                continue;
            }
            let hits = self
                .store
                .find_substring_any_field(&Field::SEARCHABLE, word)
                .await?;
            if let Some(first) = hits.into_iter().next() {
                debug!(word, field = %first.field, "Found related-notes anchor");
                return Ok(Some(first.record));
            }
        }
        Ok(None)
    }
}
