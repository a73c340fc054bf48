//! Repository layer over partition files.
//!
//! # Responsibility
//! - Provide whole-partition CRUD over one partition file.
//! - Map `(program, term)` keys to partition files under one root.
//! - Read external bulk-import files into records.
//!
//! # Invariants
//! - Every mutation is load-all, compute in memory, rewrite-all.
//! - Repositories do not enforce id uniqueness; callers check `exists`
//!   before `insert`.

pub mod import;
pub mod partition_router;
pub mod student_repo;
