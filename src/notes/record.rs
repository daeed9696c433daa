//! The subject record searched by the engine.

use serde::Serialize;

/// One subject/branch/semester entry with the location of its notes.
///
/// `full_name` is derived from code and name at construction and cannot be
/// set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    subject_code: String,
    subject_name: String,
    full_name: String,
    branch_url: String,
    semester: String,
    branch: String,
}

/// Identity used for de-duplication: `(subject_code, subject_name, semester, branch)`.
pub type RecordIdentity<'a> = (&'a str, &'a str, &'a str, &'a str);

impl Record {
    pub fn new(
        subject_code: impl Into<String>,
        subject_name: impl Into<String>,
        branch_url: impl Into<String>,
        semester: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        let subject_code = subject_code.into();
        let subject_name = subject_name.into();
        let full_name = full_name_of(&subject_code, &subject_name);
        Self {
            subject_code,
            subject_name,
            full_name,
            branch_url: branch_url.into(),
            semester: semester.into(),
            branch: branch.into(),
        }
    }

    pub fn subject_code(&self) -> &str {
        &self.subject_code
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn branch_url(&self) -> &str {
        &self.branch_url
    }

    pub fn semester(&self) -> &str {
        &self.semester
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn identity(&self) -> RecordIdentity<'_> {
        (
            &self.subject_code,
            &self.subject_name,
            &self.semester,
            &self.branch,
        )
    }

    /// Value of one searchable field.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::SubjectCode => &self.subject_code,
            Field::SubjectName => &self.subject_name,
            Field::FullName => &self.full_name,
            Field::Semester => &self.semester,
            Field::Branch => &self.branch,
        }
    }
}

/// `"{code} - {name}"`, or just the name when the code is empty.
pub fn full_name_of(subject_code: &str, subject_name: &str) -> String {
    if subject_code.is_empty() {
        subject_name.to_string()
    } else {
        format!("{} - {}", subject_code, subject_name)
    }
}

/// Searchable record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SubjectCode,
    SubjectName,
    FullName,
    Semester,
    Branch,
}

impl Field {
    /// Fields tested by substring search, in evaluation order.
    pub const SEARCHABLE: [Field; 5] = [
        Field::SubjectCode,
        Field::SubjectName,
        Field::FullName,
        Field::Semester,
        Field::Branch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SubjectCode => "subject_code",
            Field::SubjectName => "subject_name",
            Field::FullName => "full_name",
            Field::Semester => "semester",
            Field::Branch => "branch",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_with_code() {
        let record = Record::new("BCS301", "Data Structures", "/Sem3/cse", "Sem3", "cse");
        assert_eq!(record.full_name(), "BCS301 - Data Structures");
    }

    #[test]
    fn test_full_name_without_code() {
        let record = Record::new("", "Engineering Drawing", "/Sem1/cse", "Sem1", "cse");
        assert_eq!(record.full_name(), "Engineering Drawing");
    }

    #[test]
    fn test_identity_distinguishes_colliding_full_names() {
        let a = Record::new("BCS301", "DS", "/Sem3/CSE", "Sem3", "CSE");
        let b = Record::new("", "BCS301 - DS", "/Sem3/CSE", "Sem3", "CSE");

        assert_eq!(a.full_name(), b.full_name());
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_field_accessor() {
        let record = Record::new("18CS51", "Management", "/Sem5/cs", "Sem5", "cs");
        assert_eq!(record.field(Field::SubjectCode), "18CS51");
        assert_eq!(record.field(Field::FullName), "18CS51 - Management");
        assert_eq!(record.field(Field::Branch), "cs");
    }

    #[test]
    fn test_record_serializes_derived_full_name() {
        let record = Record::new("BCS301", "DS", "/Sem3/CSE", "Sem3", "CSE");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["full_name"], "BCS301 - DS");
        assert_eq!(value["branch_url"], "/Sem3/CSE");
    }
}
