//! Domain model for partitioned student records.
//!
//! # Responsibility
//! - Define the canonical student record and its partition key.
//! - Own the pure validation rules applied before any persistence.
//!
//! # Invariants
//! - A record lives in exactly one partition, addressed by `(program, term)`.
//! - Record ids are compared case-insensitively and are unique per partition,
//!   never globally.

pub mod partition;
pub mod student;
