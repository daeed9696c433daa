//! Branch bucket grouping shared by every tier's result shaping.
//!
//! Records are collapsed by `branch_url` in first-seen order. Each bucket keeps
//! its distinct subject names in first-seen order, the count before the display
//! cap was applied and the best score among its entries.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::notes::{Field, Record};

/// Subjects shown per bucket for exact matches.
pub const EXACT_DISPLAY_CAP: usize = 5;
/// Subjects shown per bucket for partial matches.
pub const PARTIAL_DISPLAY_CAP: usize = 5;
/// Subjects shown per bucket for related notes.
pub const RELATED_DISPLAY_CAP: usize = 8;

/// Buckets a renderer shows for exact matches.
pub const MAX_EXACT_BUCKETS: usize = 5;
/// Buckets a renderer shows for partial matches.
pub const MAX_PARTIAL_BUCKETS: usize = 5;
/// Buckets a renderer shows for related notes.
pub const MAX_RELATED_BUCKETS: usize = 2;

/// A subject listed inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSubject {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_field: Option<Field>,
}

/// Records sharing one `branch_url`, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchBucket {
    pub branch_url: String,
    pub semester: String,
    pub branch: String,
    /// Subjects truncated to the display cap
    pub subjects: Vec<BucketSubject>,
    /// Distinct subjects in the bucket before truncation
    pub total_subjects: usize,
    /// Best score in the bucket (0 for unscored tiers)
    pub best_score: u32,
}

impl BranchBucket {
    /// Subjects dropped by the display cap.
    pub fn hidden_subjects(&self) -> usize {
        self.total_subjects.saturating_sub(self.subjects.len())
    }

    /// `"a, b, c"`, followed by `" +N more"` when the cap hid subjects.
    pub fn subjects_text(&self) -> String {
        let names: Vec<&str> = self.subjects.iter().map(|s| s.full_name.as_str()).collect();
        let mut text = names.join(", ");
        let hidden = self.hidden_subjects();
        if hidden > 0 {
            text.push_str(&format!(" +{} more", hidden));
        }
        text
    }
}

/// One record fed into the grouper, with its score when the tier ranks.
#[derive(Debug, Clone, Copy)]
pub struct BucketEntry<'a> {
    pub record: &'a Record,
    pub score: Option<u32>,
    pub matched_field: Option<Field>,
}

impl<'a> BucketEntry<'a> {
    pub fn unscored(record: &'a Record) -> Self {
        Self {
            record,
            score: None,
            matched_field: None,
        }
    }
}

struct Accumulator {
    bucket: BranchBucket,
    names: HashSet<String>,
}

/// Group entries by `branch_url`, keeping first-seen bucket and subject order.
///
/// Every bucket's subject list is truncated to `cap`; `total_subjects` keeps
/// the count before truncation.
pub fn group_by_branch<'a>(
    entries: impl IntoIterator<Item = BucketEntry<'a>>,
    cap: usize,
) -> Vec<BranchBucket> {
    let mut order: Vec<Accumulator> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for entry in entries {
        let record = entry.record;
        let slot = *index.entry(record.branch_url()).or_insert_with(|| {
            order.push(Accumulator {
                bucket: BranchBucket {
                    branch_url: record.branch_url().to_string(),
                    semester: record.semester().to_string(),
                    branch: record.branch().to_string(),
                    subjects: Vec::new(),
                    total_subjects: 0,
                    best_score: 0,
                },
                names: HashSet::new(),
            });
            order.len() - 1
        });

        let acc = &mut order[slot];
        if let Some(score) = entry.score {
            acc.bucket.best_score = acc.bucket.best_score.max(score);
        }
        if acc.names.insert(record.full_name().to_string()) {
            acc.bucket.subjects.push(BucketSubject {
                full_name: record.full_name().to_string(),
                score: entry.score,
                matched_field: entry.matched_field,
            });
        }
    }

    order
        .into_iter()
        .map(|acc| {
            let mut bucket = acc.bucket;
            bucket.total_subjects = bucket.subjects.len();
            bucket.subjects.truncate(cap);
            bucket
        })
        .collect()
}
