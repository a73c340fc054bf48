//! Partition addressing under one root directory.
//!
//! # Responsibility
//! - Map `(program, term)` to `root/<program>/<term>.<ext>`.
//! - Create missing program directories and partition files on selection.
//! - Enumerate existing programs.
//!
//! # Invariants
//! - Key components are single, non-blank path components.
//! - Selection is idempotent on data; every call re-binds a fresh repository.

use crate::config::{ReadMode, StoreConfig};
use crate::model::partition::PartitionKey;
use crate::repo::student_repo::FileStudentRepository;
use crate::store::{PartitionFile, StoreError, StoreResult};
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves partition keys to repositories under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRouter {
    root: PathBuf,
    extension: String,
    read_mode: ReadMode,
}

impl PartitionRouter {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, read_mode: ReadMode) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
            read_mode,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            config.root_dir.clone(),
            config.extension.clone(),
            config.read_mode,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the partition file path for `key` without touching disk.
    ///
    /// # Errors
    /// - [`StoreError::InvalidPartitionKey`] when a component is blank, a
    ///   relative marker, or contains a path separator.
    pub fn partition_path(&self, key: &PartitionKey) -> StoreResult<PathBuf> {
        validate_component(&key.program)?;
        validate_component(&key.term)?;
        Ok(self
            .root
            .join(&key.program)
            .join(format!("{}.{}", key.term, self.extension)))
    }

    /// Ensures the program directory and partition file exist, then returns
    /// a repository bound to that file.
    pub fn select(&self, key: &PartitionKey) -> StoreResult<FileStudentRepository> {
        let path = self.partition_path(key)?;
        let program_dir = self.root.join(&key.program);
        if !program_dir.is_dir() {
            fs::create_dir_all(&program_dir)
                .map_err(|err| StoreError::io("create directory", &program_dir, err))?;
        }
        let created = PartitionFile::new(&path).ensure_exists()?;

        debug!(
            "event=partition_select module=router status=ok created={} path={}",
            created,
            path.display()
        );
        Ok(FileStudentRepository::new(path, self.read_mode))
    }

    /// Lists immediate subdirectory names of the root, sorted.
    ///
    /// Returns an empty list when the root does not exist.
    pub fn list_programs(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io("list", &self.root, err)),
        };

        let mut programs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io("list", &self.root, err))?;
            if entry.path().is_dir() {
                programs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        programs.sort();
        Ok(programs)
    }
}

fn validate_component(value: &str) -> StoreResult<()> {
    let reason = if value.trim().is_empty() {
        Some("must not be blank")
    } else if value == "." || value == ".." {
        Some("must not be a relative path marker")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidPartitionKey {
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
