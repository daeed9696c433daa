//! Search result variants, one fixed shape per tier.

use serde::Serialize;

use super::grouping::{
    group_by_branch, BranchBucket, BucketEntry, EXACT_DISPLAY_CAP, MAX_EXACT_BUCKETS,
    MAX_PARTIAL_BUCKETS, MAX_RELATED_BUCKETS, RELATED_DISPLAY_CAP,
};
use crate::notes::Record;

/// Which exact tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactCode,
    ExactName,
}

/// Tier that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Exact,
    Partial,
    Related,
    None,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Exact => "exact",
            Tier::Partial => "partial",
            Tier::Related => "related",
            Tier::None => "none",
        }
    }

    /// Buckets a renderer shows for this tier.
    pub fn max_buckets(&self) -> usize {
        match self {
            Tier::Exact => MAX_EXACT_BUCKETS,
            Tier::Partial => MAX_PARTIAL_BUCKETS,
            Tier::Related => MAX_RELATED_BUCKETS,
            Tier::None => 0,
        }
    }
}

/// Outcome of a search. Every variant is a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchResult {
    Exact(ExactResult),
    Partial(PartialResult),
    Related(RelatedResult),
    None(NoneResult),
}

impl SearchResult {
    pub fn tier(&self) -> Tier {
        match self {
            SearchResult::Exact(_) => Tier::Exact,
            SearchResult::Partial(_) => Tier::Partial,
            SearchResult::Related(_) => Tier::Related,
            SearchResult::None(_) => Tier::None,
        }
    }

    /// The query as the caller sent it.
    pub fn query(&self) -> &str {
        match self {
            SearchResult::Exact(r) => &r.query,
            SearchResult::Partial(r) => &r.query,
            SearchResult::Related(r) => &r.query,
            SearchResult::None(r) => &r.query,
        }
    }

    /// Display buckets for the variant, built with its call-site cap.
    pub fn buckets(&self) -> Vec<BranchBucket> {
        match self {
            SearchResult::Exact(r) => r.buckets(),
            SearchResult::Partial(r) => r.buckets.clone(),
            SearchResult::Related(r) => r.buckets(),
            SearchResult::None(_) => Vec::new(),
        }
    }
}

/// A record matched exactly on code or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactHit {
    #[serde(flatten)]
    pub record: Record,
    pub match_type: MatchType,
}

/// Exact matches; every hit shares one match type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactResult {
    pub query: String,
    pub match_type: MatchType,
    pub results: Vec<ExactHit>,
}

impl ExactResult {
    pub fn buckets(&self) -> Vec<BranchBucket> {
        group_by_branch(
            self.results.iter().map(|hit| BucketEntry::unscored(&hit.record)),
            EXACT_DISPLAY_CAP,
        )
    }
}

/// Scored partial matches grouped by branch, best bucket first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialResult {
    pub query: String,
    pub buckets: Vec<BranchBucket>,
    /// De-duplicated matches before the limit was applied
    pub total_matches: usize,
}

/// Everything offered in the semester and branch of an anchor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedResult {
    pub query: String,
    pub results: Vec<Record>,
    pub searched_semester: String,
    pub searched_branch: String,
}

impl RelatedResult {
    pub fn buckets(&self) -> Vec<BranchBucket> {
        group_by_branch(
            self.results.iter().map(BucketEntry::unscored),
            RELATED_DISPLAY_CAP,
        )
    }
}

/// Nothing matched; only the query is echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoneResult {
    pub query: String,
}
