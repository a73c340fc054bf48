//! Core domain logic for Gradebook.
//! This crate is the single source of truth for student-record invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::{ReadMode, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::partition::PartitionKey;
pub use model::student::{validation_messages, StudentRecord, StudentValidationError, Violation};
pub use repo::import::{ImportError, ImportResult};
pub use repo::partition_router::PartitionRouter;
pub use repo::student_repo::{FileStudentRepository, PartitionSnapshot, StudentRepository};
pub use search::hierarchy::{search_partitions, SearchHit};
pub use service::student_service::{EditOutcome, ServiceError, ServiceResult, StudentSession};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
