//! Hierarchy-wide search entry points.
//!
//! # Responsibility
//! - Scan every partition under a root and match records by id or name.

pub mod hierarchy;
