//! Store configuration.
//!
//! # Responsibility
//! - Hold the root directory, partition extension, read mode and default
//!   partition used to open a session.
//! - Resolve overrides from process environment.
//!
//! # Invariants
//! - `Default` values match the on-disk layout of existing installations
//!   (`Alumnos/<program>/<term>.txt`).

use crate::model::partition::PartitionKey;
use std::path::PathBuf;

pub const DEFAULT_ROOT_DIR: &str = "Alumnos";
pub const DEFAULT_EXTENSION: &str = "txt";
pub const DEFAULT_PROGRAM: &str = "Ingeniería en Sistemas";
pub const DEFAULT_TERM: &str = "Quinto Semestre";

pub const ROOT_ENV_VAR: &str = "GRADEBOOK_ROOT";
pub const READ_MODE_ENV_VAR: &str = "GRADEBOOK_READ_MODE";

/// How list-style reads react to storage failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Degrade to an empty result and log a warning.
    #[default]
    Lenient,
    /// Propagate the storage error to the caller.
    Strict,
}

impl ReadMode {
    /// Parses `strict|lenient` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }
}

/// Configuration for opening a [`crate::StudentSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root_dir: PathBuf,
    /// Partition file extension without the leading dot.
    pub extension: String,
    pub read_mode: ReadMode,
    /// Partition selected when a session opens.
    pub default_partition: PartitionKey,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            read_mode: ReadMode::default(),
            default_partition: PartitionKey::new(DEFAULT_PROGRAM, DEFAULT_TERM),
        }
    }
}

impl StoreConfig {
    /// Creates default configuration rooted at `root_dir`.
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Builds configuration from defaults plus environment overrides.
    ///
    /// - `GRADEBOOK_ROOT`: root directory (ignored when blank).
    /// - `GRADEBOOK_READ_MODE`: `strict|lenient` (ignored when unknown).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(ROOT_ENV_VAR) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.root_dir = PathBuf::from(trimmed);
            }
        }
        if let Some(mode) = std::env::var(READ_MODE_ENV_VAR)
            .ok()
            .as_deref()
            .and_then(ReadMode::parse)
        {
            config.read_mode = mode;
        }
        config
    }
}
