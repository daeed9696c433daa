//! Semester queries and the per-semester branch menu.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ServiceError;
use crate::notes::RecordStore;

/// Semester identifiers used by the notes catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Semester {
    Chemistrycycle,
    Physicscycle,
    Sem3,
    Sem4,
    Sem5,
    Sem6,
}

impl Semester {
    /// Identifier as stored on records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Chemistrycycle => "Chemistrycycle",
            Semester::Physicscycle => "Physicscycle",
            Semester::Sem3 => "Sem3",
            Semester::Sem4 => "Sem4",
            Semester::Sem5 => "Sem5",
            Semester::Sem6 => "Sem6",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Semester::Chemistrycycle => "1st Semester (Chemistry Cycle)",
            Semester::Physicscycle => "2nd Semester (Physics Cycle)",
            Semester::Sem3 => "3rd Semester",
            Semester::Sem4 => "4th Semester",
            Semester::Sem5 => "5th Semester",
            Semester::Sem6 => "6th Semester",
        }
    }

    /// Map a number, ordinal or cycle name to a semester.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "1" | "first" | "1st" | "chemistry" => Some(Semester::Chemistrycycle),
            "2" | "second" | "2nd" | "physics" => Some(Semester::Physicscycle),
            "3" | "third" | "3rd" => Some(Semester::Sem3),
            "4" | "fourth" | "4th" => Some(Semester::Sem4),
            "5" | "fifth" | "5th" => Some(Semester::Sem5),
            "6" | "sixth" | "6th" => Some(Semester::Sem6),
            _ => None,
        }
    }

    /// Accept either a stored identifier (`Sem4`) or a free-text query.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        [
            Semester::Chemistrycycle,
            Semester::Physicscycle,
            Semester::Sem3,
            Semester::Sem4,
            Semester::Sem5,
            Semester::Sem6,
        ]
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(trimmed))
        .or_else(|| parse_semester_query(trimmed))
    }
}

fn semester_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:for\s+)?(\d+)(?:st|nd|rd|th)?\s*sem(?:ester)?(?:\s+link)?",
            r"(?:for\s+)?sem(?:ester)?\s*(\d+)(?:\s+link)?",
            r"(?:for\s+)?(\w+)\s*cycle(?:\s+link)?",
        ]
        .map(|p| Regex::new(p).expect("semester pattern is valid"))
    })
}

/// Recognise phrases such as `4th sem`, `semester 5` or `chemistry cycle`.
///
/// Patterns are tried in order. A pattern whose captured token is not a
/// known semester falls through to the next one.
pub fn parse_semester_query(text: &str) -> Option<Semester> {
    let text = text.trim().to_lowercase();
    semester_patterns().iter().find_map(|pattern| {
        pattern
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Semester::from_token(m.as_str()))
    })
}

/// Human readable branch name.
pub fn branch_display_name(branch: &str) -> String {
    match branch {
        "computerscience" => "Computer Science".to_string(),
        "electronicsandcommunications" => "ECE".to_string(),
        "informationscience" => "Information Science".to_string(),
        "aiml" => "AI & ML".to_string(),
        "aids" => "AI & DS".to_string(),
        other => title_case(other),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One branch entry in a semester menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchLink {
    pub branch: String,
    pub display_name: String,
    pub url: String,
}

/// Branches offered in one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterMenu {
    pub semester: Semester,
    pub display_name: &'static str,
    pub branches: Vec<BranchLink>,
}

/// Build the branch menu for `semester`, or `None` when it has no notes.
pub async fn semester_menu(
    store: &dyn RecordStore,
    semester: Semester,
    base_url: &str,
) -> Result<Option<SemesterMenu>, ServiceError> {
    let branches = store.distinct_branches(semester.as_str()).await?;
    if branches.is_empty() {
        return Ok(None);
    }

    let branches = branches
        .into_iter()
        .map(|branch| BranchLink {
            display_name: branch_display_name(&branch),
            url: format!("{}/{}/{}", base_url, semester.as_str(), branch),
            branch,
        })
        .collect();

    Ok(Some(SemesterMenu {
        semester,
        display_name: semester.display_name(),
        branches,
    }))
}
