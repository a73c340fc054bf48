//! FFI surface for the Gradebook UI shell.
//!
//! # Responsibility
//! - Expose the core session operations as never-panicking, use-case level
//!   functions for `flutter_rust_bridge`.

pub mod api;
