//! Partial-match scoring and de-duplication.
//!
//! A (record, field) hit scores the field's base weight plus:
//! - `+5` when the query is one whole whitespace-delimited word of the value
//! - `+3` when the value starts with the query
//! - `+max(0, 10 - len(value))` favouring short, specific values

use std::collections::HashMap;

use crate::notes::{Field, FieldMatch, Record};

pub const WORD_MATCH_BONUS: u32 = 5;
pub const PREFIX_BONUS: u32 = 3;
pub const SHORT_VALUE_THRESHOLD: u32 = 10;

/// Base weight of a hit in each searchable field.
pub fn field_weight(field: Field) -> u32 {
    match field {
        Field::SubjectCode => 10,
        Field::SubjectName => 8,
        Field::FullName => 6,
        Field::Semester => 3,
        Field::Branch => 2,
    }
}

/// Score a hit of the normalized `query` inside `value`.
pub fn score_match(field: Field, value: &str, query: &str) -> u32 {
    let value = value.to_lowercase();
    let mut score = field_weight(field);

    if value.split_whitespace().any(|word| word == query) {
        score += WORD_MATCH_BONUS;
    }
    if value.starts_with(query) {
        score += PREFIX_BONUS;
    }
    let len = u32::try_from(value.chars().count()).unwrap_or(u32::MAX);
    score += SHORT_VALUE_THRESHOLD.saturating_sub(len);

    score
}

/// A de-duplicated partial match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMatch {
    pub record: Record,
    pub field: Field,
    pub score: u32,
}

/// Score every hit, keep the best-scoring hit per record identity and order
/// by score descending.
///
/// Identities keep the position of their first hit; equal scores keep that
/// order, so the same input always ranks the same way.
pub fn rank(matches: Vec<FieldMatch>, query: &str) -> Vec<ScoredMatch> {
    let mut ranked: Vec<ScoredMatch> = Vec::new();
    let mut positions: HashMap<(String, String, String, String), usize> = HashMap::new();

    for FieldMatch { record, field } in matches {
        let score = score_match(field, record.field(field), query);
        let (code, name, semester, branch) = record.identity();
        let key = (
            code.to_string(),
            name.to_string(),
            semester.to_string(),
            branch.to_string(),
        );

        match positions.get(&key) {
            Some(&pos) => {
                let best = &mut ranked[pos];
                if score > best.score {
                    best.score = score;
                    best.field = field;
                }
            }
            None => {
                positions.insert(key, ranked.len());
                ranked.push(ScoredMatch {
                    record,
                    field,
                    score,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_components() {
        // code weight 10 + word 5 + prefix 3 + (10 - 6)
        assert_eq!(score_match(Field::SubjectCode, "BCS301", "bcs301"), 22);
        // name weight 8 + word 5 + prefix 3, value longer than 10
        assert_eq!(score_match(Field::SubjectName, "Data Structures", "data"), 16);
        // name weight 8, mid-word substring, long value
        assert_eq!(score_match(Field::SubjectName, "Big Database Systems", "data"), 8);
        // branch weight 2 + prefix 3 + (10 - 3)
        assert_eq!(score_match(Field::Branch, "cse", "cs"), 12);
    }

    #[test]
    fn test_short_value_bonus_never_negative() {
        let long = "a".repeat(40);
        assert_eq!(score_match(Field::FullName, &long, "zz"), 6);
    }

    #[test]
    fn test_code_hit_outscores_branch_hit() {
        let code = score_match(Field::SubjectCode, "XYZ101", "xyz");
        let branch = score_match(Field::Branch, "xyz", "xyz");
        assert!(code >= branch);
    }

    #[test]
    fn test_rank_keeps_max_score_per_identity() {
        let record = Record::new("BCS304", "Data Structures", "/Sem3/cse", "Sem3", "cse");
        let matches = vec![
            FieldMatch {
                record: record.clone(),
                field: Field::FullName,
            },
            FieldMatch {
                record: record.clone(),
                field: Field::SubjectName,
            },
        ];

        let ranked = rank(matches, "data");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].field, Field::SubjectName);
        assert_eq!(ranked[0].score, 16);
    }

    #[test]
    fn test_rank_keeps_colliding_full_names_apart() {
        let a = Record::new("BCS301", "DS", "/Sem3/CSE", "Sem3", "CSE");
        let b = Record::new("", "BCS301 - DS", "/Sem3/CSE", "Sem3", "CSE");
        let matches = vec![
            FieldMatch {
                record: a,
                field: Field::FullName,
            },
            FieldMatch {
                record: b,
                field: Field::FullName,
            },
        ];

        let ranked = rank(matches, "bcs301");
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let first = Record::new("", "Data One", "/a", "S", "x");
        let second = Record::new("", "Data Two", "/b", "S", "x");
        let matches = vec![
            FieldMatch {
                record: first.clone(),
                field: Field::SubjectName,
            },
            FieldMatch {
                record: second.clone(),
                field: Field::SubjectName,
            },
        ];

        let ranked = rank(matches, "data");
        assert_eq!(ranked[0].record, first);
        assert_eq!(ranked[1].record, second);
    }
}
