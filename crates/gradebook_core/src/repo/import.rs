//! Bulk-import source reader for the comma-delimited exchange format.
//!
//! # Responsibility
//! - Read an external import file and parse every line up front.
//! - Report malformed numeric columns with their line number.
//!
//! # Invariants
//! - Lines with fewer than nine fields are skipped, never errors.
//! - A malformed line fails the whole import before any record is written.

use crate::model::student::StudentRecord;
use crate::store::codec::{parse_delimited, CodecError, DelimitedLine};
use crate::store::{lossy_lines, StoreError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

pub type ImportResult<T> = Result<T, ImportError>;

/// Bulk-import failure.
#[derive(Debug)]
pub enum ImportError {
    /// Import source cannot be opened or read.
    Io { path: PathBuf, source: io::Error },
    /// One line holds a malformed numeric column.
    Parse { line: usize, source: CodecError },
    /// Target partition cannot be resolved, read or written.
    Store(StoreError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read import file `{}`: {source}", path.display())
            }
            Self::Parse { line, source } => write!(f, "import line {line}: {source}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Parsed import source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    /// Records in source line order.
    pub records: Vec<StudentRecord>,
    /// Lines ignored for having fewer than nine fields.
    pub skipped_lines: usize,
}

/// Reads and parses a comma-delimited import file.
///
/// # Errors
/// - [`ImportError::Io`] when the file cannot be opened or read.
/// - [`ImportError::Parse`] on the first line with a malformed score or age.
pub fn read_import_file(path: &Path) -> ImportResult<ImportBatch> {
    let io_error = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let lines = lossy_lines(BufReader::new(file)).map_err(io_error)?;

    let mut batch = ImportBatch::default();
    for (index, line) in lines.iter().enumerate() {
        match parse_delimited(line) {
            Ok(DelimitedLine::Record(record)) => batch.records.push(record),
            Ok(DelimitedLine::Skipped) => batch.skipped_lines += 1,
            Err(source) => {
                return Err(ImportError::Parse {
                    line: index + 1,
                    source,
                });
            }
        }
    }

    debug!(
        "event=import_parse module=repo status=ok records={} skipped_lines={}",
        batch.records.len(),
        batch.skipped_lines
    );
    Ok(batch)
}
