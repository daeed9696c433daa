//! Notes search: tiered matching, scoring and result shaping.

mod engine;
pub mod grouping;
mod result;
pub mod scoring;

pub use engine::{normalize_query, SearchEngine, ANCHOR_MIN_WORD_LEN, RELATED_CAP};
pub use grouping::{BranchBucket, BucketSubject};
pub use result::{
    ExactHit, ExactResult, MatchType, NoneResult, PartialResult, RelatedResult, SearchResult, Tier,
};
