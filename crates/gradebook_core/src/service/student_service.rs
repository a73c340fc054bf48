//! Student session service.
//!
//! # Responsibility
//! - Track the active partition for single-partition operations.
//! - Provide validated insert, edit-with-move, delete, lookups, hierarchy
//!   search and bulk import.
//!
//! # Invariants
//! - A session always has an active partition; opening selects the
//!   configured default.
//! - Validation and conflict checks run before any write.
//! - A cross-partition edit checks destination uniqueness before touching the
//!   source, and inserts into the destination before removing from the
//!   source: a failure can duplicate a record but never lose it.

use crate::config::StoreConfig;
use crate::model::partition::PartitionKey;
use crate::model::student::{validation_messages, StudentRecord, StudentValidationError};
use crate::repo::import::{read_import_file, ImportError, ImportResult};
use crate::repo::partition_router::PartitionRouter;
use crate::repo::student_repo::{FileStudentRepository, StudentRepository};
use crate::search::hierarchy::{search_partitions, SearchHit};
use crate::store::StoreError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from session-level operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Record failed validation; carries every violation.
    Validation(StudentValidationError),
    /// Id already present in the target partition.
    Conflict { id: String, partition: PartitionKey },
    /// Id absent from the searched partition.
    NotFound { id: String, partition: PartitionKey },
    /// Storage failure.
    Store(StoreError),
    /// Bulk-import failure.
    Import(ImportError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { id, partition } => {
                write!(f, "student id `{id}` already exists in {partition}")
            }
            Self::NotFound { id, partition } => {
                write!(f, "student id `{id}` not found in {partition}")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Conflict { .. } | Self::NotFound { .. } => None,
        }
    }
}

impl From<StudentValidationError> for ServiceError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for ServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// Result of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Record replaced inside the active partition.
    UpdatedInPlace,
    /// Record moved from the active partition to another one.
    Moved { from: PartitionKey, to: PartitionKey },
}

/// Currently selected partition and its bound repository.
#[derive(Debug, Clone)]
struct ActivePartition {
    key: PartitionKey,
    repo: FileStudentRepository,
}

/// Stateful session over a partition hierarchy.
///
/// Replaces a process-global "current file" with an explicit object owned by
/// the caller.
#[derive(Debug, Clone)]
pub struct StudentSession {
    router: PartitionRouter,
    active: ActivePartition,
}

impl StudentSession {
    /// Opens a session and selects the configured default partition.
    pub fn open(config: &StoreConfig) -> ServiceResult<Self> {
        Self::open_at(config, config.default_partition.clone())
    }

    /// Opens a session with `key` as the active partition.
    pub fn open_at(config: &StoreConfig, key: PartitionKey) -> ServiceResult<Self> {
        let router = PartitionRouter::from_config(config);
        let repo = router.select(&key)?;
        info!(
            "event=session_open module=service status=ok root={}",
            router.root().display()
        );
        Ok(Self {
            router,
            active: ActivePartition { key, repo },
        })
    }

    pub fn router(&self) -> &PartitionRouter {
        &self.router
    }

    pub fn active_key(&self) -> &PartitionKey {
        &self.active.key
    }

    /// Returns the file path of the active partition.
    pub fn active_path(&self) -> &Path {
        self.active.repo.path()
    }

    /// Switches the active partition, creating it when missing.
    ///
    /// Re-selecting the current key re-binds the repository.
    pub fn select_partition(&mut self, key: PartitionKey) -> ServiceResult<&Path> {
        let repo = self.router.select(&key)?;
        self.active = ActivePartition { key, repo };
        Ok(self.active_path())
    }

    /// Lists records of the active partition in storage order.
    pub fn list_records(&self) -> ServiceResult<Vec<StudentRecord>> {
        Ok(self.active.repo.list()?)
    }

    /// Lists program directories under the root.
    pub fn list_programs(&self) -> ServiceResult<Vec<String>> {
        Ok(self.router.list_programs()?)
    }

    /// Returns every violated constraint as a message; empty when valid.
    pub fn validate(&self, record: &StudentRecord) -> Vec<String> {
        validation_messages(record)
    }

    /// Inserts `record` into its own partition after validation and a
    /// uniqueness check there.
    pub fn insert(&self, record: &StudentRecord) -> ServiceResult<()> {
        record.validate()?;

        let key = record.partition_key();
        let repo = self.router.select(&key)?;
        if repo.exists(&record.id)? {
            return Err(ServiceError::Conflict {
                id: record.id.clone(),
                partition: key,
            });
        }
        repo.insert(record)?;

        info!("event=student_insert module=service status=ok partition={key}");
        Ok(())
    }

    /// Replaces the record identified by `original_id` in the active
    /// partition, moving it when its program/term changed.
    pub fn update(
        &mut self,
        original_id: &str,
        record: &StudentRecord,
    ) -> ServiceResult<EditOutcome> {
        record.validate()?;

        let destination_key = record.partition_key();
        if destination_key == self.active.key {
            return self.update_in_place(original_id, record);
        }

        let destination = self.router.select(&destination_key)?;
        if same_file::is_same_file(destination.path(), self.active_path()).unwrap_or(false) {
            self.update_in_place(original_id, record)?;
            self.active.repo = self.router.select(&self.active.key)?;
            return Ok(EditOutcome::UpdatedInPlace);
        }

        if destination.exists(&record.id)? {
            return Err(ServiceError::Conflict {
                id: record.id.clone(),
                partition: destination_key,
            });
        }
        if !self.active.repo.exists(original_id)? {
            return Err(self.not_found(original_id));
        }

        destination.insert(record)?;
        if let Err(err) = self.active.repo.remove(original_id) {
            warn!(
                "event=student_move module=service status=error stage=remove_source from={} to={} error={}",
                self.active.key, destination_key, err
            );
            return Err(err.into());
        }

        info!(
            "event=student_move module=service status=ok from={} to={}",
            self.active.key, destination_key
        );
        Ok(EditOutcome::Moved {
            from: self.active.key.clone(),
            to: destination_key,
        })
    }

    /// Deletes every record matching `id` from the active partition.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.active.repo.exists(id)? {
            return Err(self.not_found(id));
        }
        let removed = self.active.repo.remove(id)?;
        info!(
            "event=student_delete module=service status=ok partition={} removed={}",
            self.active.key, removed
        );
        Ok(())
    }

    /// Finds one record by id in the active partition.
    pub fn find_by_id(&self, id: &str) -> ServiceResult<Option<StudentRecord>> {
        Ok(self.active.repo.find_by_id(id)?)
    }

    /// Finds records whose name contains `fragment` in the active partition.
    pub fn find_by_name_fragment(&self, fragment: &str) -> ServiceResult<Vec<StudentRecord>> {
        Ok(self.active.repo.find_by_name_fragment(fragment)?)
    }

    /// Searches every partition under the root by exact id or name fragment.
    pub fn search_all_partitions(&self, text: &str) -> Vec<SearchHit> {
        search_partitions(self.router.root(), self.router.extension(), text)
    }

    /// Imports a comma-delimited file, routing each record to its own
    /// partition and leaving the last routed partition active.
    ///
    /// A record whose program or term is not a usable path component fails
    /// the import before anything is written.
    ///
    /// Returns the number of records actually inserted.
    pub fn import_delimited(&mut self, source: &Path) -> ImportResult<usize> {
        let batch = read_import_file(source)?;
        // Every destination key must resolve before the first write.
        for record in &batch.records {
            self.router.partition_path(&record.partition_key())?;
        }

        let mut inserted = 0;
        let mut duplicates = 0;

        for record in &batch.records {
            let key = record.partition_key();
            let repo = self.router.select(&key)?;
            self.active = ActivePartition { key, repo };

            if self.active.repo.exists(&record.id)? {
                duplicates += 1;
                continue;
            }
            self.active.repo.insert(record)?;
            inserted += 1;
        }

        info!(
            "event=import module=service status=ok mode=routing inserted={} duplicates={} skipped_lines={}",
            inserted, duplicates, batch.skipped_lines
        );
        Ok(inserted)
    }

    /// Imports a comma-delimited file into the active partition only.
    pub fn import_into_active(&self, source: &Path) -> ImportResult<usize> {
        self.active.repo.import_delimited(source)
    }

    fn update_in_place(
        &self,
        original_id: &str,
        record: &StudentRecord,
    ) -> ServiceResult<EditOutcome> {
        if !self.active.repo.update(original_id, record)? {
            return Err(self.not_found(original_id));
        }
        info!(
            "event=student_update module=service status=ok partition={}",
            self.active.key
        );
        Ok(EditOutcome::UpdatedInPlace)
    }

    fn not_found(&self, id: &str) -> ServiceError {
        ServiceError::NotFound {
            id: id.to_string(),
            partition: self.active.key.clone(),
        }
    }
}
