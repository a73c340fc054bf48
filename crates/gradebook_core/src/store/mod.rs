//! Flat-file storage primitives.
//!
//! # Responsibility
//! - Encode/decode one student record to/from one text line.
//! - Read, rewrite and append the single file backing one partition.
//!
//! # Invariants
//! - Rewrites are atomic: readers observe either the old or the new file.
//! - Blank lines are ignored on read and never emitted on rewrite.
//! - Reading an absent partition creates it and yields no lines.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod codec;
mod partition_file;

pub(crate) use partition_file::lossy_lines;
pub use partition_file::{PartitionFile, PartitionRead, LINE_TERMINATOR};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure for partition files and partition addressing.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem operation failed beyond create-on-demand.
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// Program or term cannot be used as a path component.
    InvalidPartitionKey { value: String, reason: &'static str },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { op, path, source } => {
                write!(f, "failed to {op} `{}`: {source}", path.display())
            }
            Self::InvalidPartitionKey { value, reason } => {
                write!(f, "invalid partition key component `{value}`: {reason}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidPartitionKey { .. } => None,
        }
    }
}
