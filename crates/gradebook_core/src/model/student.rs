//! Student record domain model.
//!
//! # Responsibility
//! - Define the nine-field record stored in every partition.
//! - Provide pure validation that collects every violated constraint.
//!
//! # Invariants
//! - `id` is non-empty and alphanumeric (`[A-Za-z0-9]+`) after trimming.
//! - `0 <= score <= 10` and `15 <= age <= 120`.
//! - `email` is either blank or matches the relaxed `.+@.+\..+` pattern.
//! - Validation never performs I/O and never short-circuits.

use crate::model::partition::PartitionKey;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;
pub const AGE_MIN: i32 = 15;
pub const AGE_MAX: i32 = 120;

static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid id regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+@.+\..+$").expect("valid email regex"));

/// One student's stored attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    /// Unique within its partition, compared case-insensitively.
    pub id: String,
    /// Grade average in `[0, 10]`.
    pub score: f64,
    /// Partition-key component.
    pub term: String,
    pub age: i32,
    /// Partition-key component.
    pub program: String,
    /// Optional; empty means "not provided".
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl StudentRecord {
    /// Returns the key of the partition this record belongs to.
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey::new(self.program.clone(), self.term.clone())
    }

    /// Returns whether this record's id matches `id` ignoring case and
    /// surrounding whitespace.
    pub fn has_id(&self, id: &str) -> bool {
        self.id.trim().eq_ignore_ascii_case(id.trim())
    }

    /// Validates all record invariants.
    ///
    /// # Errors
    /// - Returns every violated constraint, in declaration order.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push(Violation::NameRequired);
        }

        let id = self.id.trim();
        if id.is_empty() {
            violations.push(Violation::IdRequired);
        } else if !ID_RE.is_match(id) {
            violations.push(Violation::IdNotAlphanumeric(id.to_string()));
        }

        if !(SCORE_MIN..=SCORE_MAX).contains(&self.score) {
            violations.push(Violation::ScoreOutOfRange(self.score));
        }

        if !(AGE_MIN..=AGE_MAX).contains(&self.age) {
            violations.push(Violation::AgeOutOfRange(self.age));
        }

        let email = self.email.trim();
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            violations.push(Violation::InvalidEmail(email.to_string()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(StudentValidationError { violations })
        }
    }
}

/// Returns the ordered list of human-readable validation messages.
///
/// Empty result means the record is valid.
pub fn validation_messages(record: &StudentRecord) -> Vec<String> {
    match record.validate() {
        Ok(()) => Vec::new(),
        Err(err) => err.messages(),
    }
}

/// One violated record constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    NameRequired,
    IdRequired,
    IdNotAlphanumeric(String),
    ScoreOutOfRange(f64),
    AgeOutOfRange(i32),
    InvalidEmail(String),
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "name is required"),
            Self::IdRequired => write!(f, "id is required"),
            Self::IdNotAlphanumeric(value) => {
                write!(f, "id must be alphanumeric without spaces: `{value}`")
            }
            Self::ScoreOutOfRange(value) => write!(
                f,
                "score must be between {SCORE_MIN} and {SCORE_MAX}, got {value}"
            ),
            Self::AgeOutOfRange(value) => {
                write!(f, "age must be between {AGE_MIN} and {AGE_MAX}, got {value}")
            }
            Self::InvalidEmail(value) => write!(f, "email has an invalid format: `{value}`"),
        }
    }
}

/// Validation failure carrying every violated constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentValidationError {
    violations: Vec<Violation>,
}

impl StudentValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid student record: {}", self.messages().join("; "))
    }
}

impl Error for StudentValidationError {}

#[cfg(test)]
mod tests {
    use super::{validation_messages, StudentRecord, Violation};

    fn valid_record() -> StudentRecord {
        StudentRecord {
            name: "Ana Ruiz".to_string(),
            id: "A100".to_string(),
            score: 9.2,
            term: "Term5".to_string(),
            age: 21,
            program: "Engineering".to_string(),
            email: "ana@uni.edu".to_string(),
            phone: "555-0100".to_string(),
            address: "Main St 1".to_string(),
        }
    }

    #[test]
    fn accepts_valid_record() {
        assert!(valid_record().validate().is_ok());
        assert!(validation_messages(&valid_record()).is_empty());
    }

    #[test]
    fn accepts_boundary_values_and_blank_email() {
        let mut record = valid_record();
        record.score = 0.0;
        record.age = 15;
        record.email = "  ".to_string();
        assert!(record.validate().is_ok());

        record.score = 10.0;
        record.age = 120;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn collects_all_violations_in_order() {
        let record = StudentRecord {
            name: " ".to_string(),
            id: "A 1".to_string(),
            score: 10.5,
            age: 14,
            email: "not-an-email".to_string(),
            ..StudentRecord::default()
        };

        let err = record.validate().expect_err("invalid record must be rejected");
        assert_eq!(err.violations().len(), 5);
        assert_eq!(err.violations()[0], Violation::NameRequired);
        assert!(matches!(err.violations()[1], Violation::IdNotAlphanumeric(_)));
        assert!(matches!(err.violations()[2], Violation::ScoreOutOfRange(_)));
        assert_eq!(err.violations()[3], Violation::AgeOutOfRange(14));
        assert!(matches!(err.violations()[4], Violation::InvalidEmail(_)));
    }

    #[test]
    fn empty_id_reports_required_only() {
        let mut record = valid_record();
        record.id = String::new();
        let err = record.validate().expect_err("invalid record must be rejected");
        assert_eq!(err.violations(), &[Violation::IdRequired]);
    }

    #[test]
    fn nan_score_is_out_of_range() {
        let mut record = valid_record();
        record.score = f64::NAN;
        let err = record.validate().expect_err("invalid record must be rejected");
        assert!(matches!(err.violations()[0], Violation::ScoreOutOfRange(_)));
    }

    #[test]
    fn has_id_ignores_case_and_whitespace() {
        let record = valid_record();
        assert!(record.has_id("a100"));
        assert!(record.has_id(" A100 "));
        assert!(!record.has_id("A10"));
    }
}
