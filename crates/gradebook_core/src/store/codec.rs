//! Line codecs for student records.
//!
//! # Responsibility
//! - Serialize records into the internal pipe-delimited partition format.
//! - Decode partition lines leniently (`decode`) or strictly (`try_decode`).
//! - Parse the external comma-delimited bulk-import format.
//!
//! # Invariants
//! - `encode` never emits a line break or an unescaped field delimiter.
//! - `decode` never fails: missing or malformed fields become zero values.
//! - Field order is `name|id|score|term|age|program|email|phone|address`.

use crate::model::student::StudentRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field delimiter of the internal partition format.
pub const FIELD_DELIMITER: char = '|';
/// Field delimiter of the external bulk-import format.
pub const IMPORT_DELIMITER: char = ',';
/// Number of positional fields in both formats.
pub const FIELD_COUNT: usize = 9;

const COLUMN_NAMES: [&str; FIELD_COUNT] = [
    "name", "id", "score", "term", "age", "program", "email", "phone", "address",
];

/// Encodes one record as one partition line.
pub fn encode(record: &StudentRecord) -> String {
    [
        sanitize(&record.name),
        sanitize(&record.id),
        record.score.to_string(),
        sanitize(&record.term),
        record.age.to_string(),
        sanitize(&record.program),
        sanitize(&record.email),
        sanitize(&record.phone),
        sanitize(&record.address),
    ]
    .join(&FIELD_DELIMITER.to_string())
}

/// Decodes one partition line, defaulting anything missing or malformed.
pub fn decode(line: &str) -> StudentRecord {
    let fields = line.split(FIELD_DELIMITER).collect::<Vec<_>>();
    let text = |index: usize| fields.get(index).map(|v| v.to_string()).unwrap_or_default();

    StudentRecord {
        name: text(0),
        id: text(1),
        score: fields
            .get(2)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        term: text(3),
        age: fields
            .get(4)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(0),
        program: text(5),
        email: text(6),
        phone: text(7),
        address: text(8),
    }
}

/// Strict line decode used by hierarchy-wide scans.
///
/// Fields are trimmed. At least the name and id positions must be present,
/// and any non-empty numeric field must parse.
///
/// # Errors
/// - [`CodecError::TooFewFields`] when the id position is missing.
/// - [`CodecError::InvalidNumber`] when score or age text is malformed.
pub fn try_decode(line: &str) -> Result<StudentRecord, CodecError> {
    let fields = line
        .trim()
        .split(FIELD_DELIMITER)
        .map(str::trim)
        .collect::<Vec<_>>();
    if fields.len() < 2 {
        return Err(CodecError::TooFewFields {
            found: fields.len(),
            required: 2,
        });
    }
    let text = |index: usize| fields.get(index).map(|v| v.to_string()).unwrap_or_default();

    let score = match fields.get(2) {
        Some(value) if !value.is_empty() => parse_number(2, value)?,
        _ => 0.0,
    };
    let age = match fields.get(4) {
        Some(value) if !value.is_empty() => parse_number(4, value)?,
        _ => 0,
    };

    Ok(StudentRecord {
        name: text(0),
        id: text(1),
        score,
        term: text(3),
        age,
        program: text(5),
        email: text(6),
        phone: text(7),
        address: text(8),
    })
}

/// Outcome of parsing one line of the external comma-delimited format.
#[derive(Debug, Clone, PartialEq)]
pub enum DelimitedLine {
    /// Line has fewer than nine fields and is ignored.
    Skipped,
    Record(StudentRecord),
}

/// Parses one bulk-import line (`name,id,score,term,age,program,email,phone,address`).
///
/// Fields beyond the ninth are ignored. Text fields are taken verbatim.
/// Trailing empty fields still count toward the nine, so
/// `Ana,A1,9,T1,20,Eng,,,` yields a record with blank email, phone and
/// address. Legacy importers dropped trailing empties and skipped such lines.
///
/// # Errors
/// - [`CodecError::InvalidNumber`] when score or age is malformed. Unlike
///   [`decode`], the import format never defaults bad numbers.
pub fn parse_delimited(line: &str) -> Result<DelimitedLine, CodecError> {
    let fields = line
        .trim_end_matches(['\r', '\n'])
        .split(IMPORT_DELIMITER)
        .collect::<Vec<_>>();
    if fields.len() < FIELD_COUNT {
        return Ok(DelimitedLine::Skipped);
    }

    Ok(DelimitedLine::Record(StudentRecord {
        name: fields[0].to_string(),
        id: fields[1].to_string(),
        score: parse_number(2, fields[2])?,
        term: fields[3].to_string(),
        age: parse_number(4, fields[4])?,
        program: fields[5].to_string(),
        email: fields[6].to_string(),
        phone: fields[7].to_string(),
        address: fields[8].to_string(),
    }))
}

/// Codec-level failure for strict decoding paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    TooFewFields { found: usize, required: usize },
    InvalidNumber { column: &'static str, value: String },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFields { found, required } => {
                write!(f, "expected at least {required} fields, found {found}")
            }
            Self::InvalidNumber { column, value } => {
                write!(f, "column `{column}` is not a valid number: `{value}`")
            }
        }
    }
}

impl Error for CodecError {}

fn parse_number<T: std::str::FromStr>(index: usize, value: &str) -> Result<T, CodecError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| CodecError::InvalidNumber {
            column: COLUMN_NAMES[index],
            value: value.to_string(),
        })
}

fn sanitize(value: &str) -> String {
    value.replace(['\n', '\r', FIELD_DELIMITER], " ")
}
