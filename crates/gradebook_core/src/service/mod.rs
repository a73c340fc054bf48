//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate router and repository calls into the session-level
//!   operation set used by UI/FFI/CLI shells.
//! - Enforce validation and per-partition id uniqueness above the
//!   repository layer.

pub mod student_service;
