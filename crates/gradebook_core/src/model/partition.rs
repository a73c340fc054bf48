//! Partition key model.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Two-level key addressing one partition file: `root/<program>/<term>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub program: String,
    pub term: String,
}

impl PartitionKey {
    pub fn new(program: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            term: term.into(),
        }
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.program, self.term)
    }
}
