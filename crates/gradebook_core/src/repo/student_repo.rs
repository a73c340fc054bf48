//! Student repository contract and partition-file implementation.
//!
//! # Responsibility
//! - Provide CRUD over the records of one partition.
//! - Keep line encoding details inside the store boundary.
//!
//! # Invariants
//! - Every operation loads the whole partition before mutating it.
//! - Mutations and `exists` always read strictly, so a failed read is never
//!   followed by a rewrite from an empty list or a duplicate append.
//! - `insert` does not check id uniqueness.

use crate::config::ReadMode;
use crate::model::student::StudentRecord;
use crate::repo::import::{read_import_file, ImportResult};
use crate::store::codec::{decode, encode};
use crate::store::{PartitionFile, PartitionRead, StoreResult};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Typed strict read of one partition.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionSnapshot {
    /// Partition was absent and has just been created.
    Created,
    /// Records in file order.
    Loaded(Vec<StudentRecord>),
}

impl PartitionSnapshot {
    pub fn into_records(self) -> Vec<StudentRecord> {
        match self {
            Self::Created => Vec::new(),
            Self::Loaded(records) => records,
        }
    }
}

/// Repository interface for single-partition record operations.
pub trait StudentRepository {
    /// Lists all records in storage order.
    fn list(&self) -> StoreResult<Vec<StudentRecord>>;
    /// Returns whether any record matches `id` case-insensitively.
    ///
    /// Guards inserts, so read failures propagate in every read mode.
    fn exists(&self, id: &str) -> StoreResult<bool>;
    /// Appends one record without a uniqueness check.
    fn insert(&self, record: &StudentRecord) -> StoreResult<()>;
    /// Removes every record matching `id`; returns how many were removed.
    fn remove(&self, id: &str) -> StoreResult<usize>;
    /// Replaces the first record matching `id`; `false` when none matched.
    fn update(&self, id: &str, record: &StudentRecord) -> StoreResult<bool>;
}

/// Repository bound to one partition file.
#[derive(Debug, Clone)]
pub struct FileStudentRepository {
    file: PartitionFile,
    read_mode: ReadMode,
}

impl FileStudentRepository {
    pub fn new(path: impl Into<PathBuf>, read_mode: ReadMode) -> Self {
        Self {
            file: PartitionFile::new(path),
            read_mode,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read_mode(&self) -> ReadMode {
        self.read_mode
    }

    /// Strictly loads the partition, distinguishing "just created" from
    /// "existing", regardless of read mode.
    pub fn snapshot(&self) -> StoreResult<PartitionSnapshot> {
        Ok(match self.file.read()? {
            PartitionRead::Created => PartitionSnapshot::Created,
            PartitionRead::Lines(lines) => {
                PartitionSnapshot::Loaded(lines.iter().map(|line| decode(line)).collect())
            }
        })
    }

    /// Finds the first record whose id matches case-insensitively.
    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<StudentRecord>> {
        Ok(self.list()?.into_iter().find(|record| record.has_id(id)))
    }

    /// Lists records whose name contains `fragment`, ignoring case.
    pub fn find_by_name_fragment(&self, fragment: &str) -> StoreResult<Vec<StudentRecord>> {
        let needle = fragment.to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Imports a comma-delimited file into this partition, skipping ids that
    /// are already present. Records are stored here regardless of their own
    /// program/term.
    ///
    /// Returns the number of records actually inserted.
    pub fn import_delimited(&self, source: &Path) -> ImportResult<usize> {
        let batch = read_import_file(source)?;
        let mut inserted = 0;
        let mut duplicates = 0;
        for record in &batch.records {
            if self.exists(&record.id)? {
                duplicates += 1;
                continue;
            }
            self.insert(record)?;
            inserted += 1;
        }

        info!(
            "event=import module=repo status=ok mode=partition inserted={} duplicates={} skipped_lines={}",
            inserted, duplicates, batch.skipped_lines
        );
        Ok(inserted)
    }

    fn load_strict(&self) -> StoreResult<Vec<StudentRecord>> {
        self.snapshot().map(PartitionSnapshot::into_records)
    }

    fn rewrite(&self, records: &[StudentRecord]) -> StoreResult<()> {
        let lines = records.iter().map(encode).collect::<Vec<_>>();
        self.file.write_all(&lines)
    }
}

impl StudentRepository for FileStudentRepository {
    fn list(&self) -> StoreResult<Vec<StudentRecord>> {
        match (self.load_strict(), self.read_mode) {
            (Ok(records), _) => Ok(records),
            (Err(err), ReadMode::Lenient) => {
                warn!(
                    "event=partition_list module=repo status=degraded path={} error={}",
                    self.path().display(),
                    err
                );
                Ok(Vec::new())
            }
            (Err(err), ReadMode::Strict) => Err(err),
        }
    }

    fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.load_strict()?.iter().any(|record| record.has_id(id)))
    }

    fn insert(&self, record: &StudentRecord) -> StoreResult<()> {
        self.file.append(&encode(record))
    }

    fn remove(&self, id: &str) -> StoreResult<usize> {
        let mut records = self.load_strict()?;
        let before = records.len();
        records.retain(|record| !record.has_id(id));
        let removed = before - records.len();
        self.rewrite(&records)?;
        Ok(removed)
    }

    fn update(&self, id: &str, record: &StudentRecord) -> StoreResult<bool> {
        let mut records = self.load_strict()?;
        let Some(slot) = records.iter_mut().find(|existing| existing.has_id(id)) else {
            return Ok(false);
        };
        *slot = record.clone();
        self.rewrite(&records)?;
        Ok(true)
    }
}
