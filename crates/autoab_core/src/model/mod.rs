//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical record shape shared by storage and search.
//! - Provide closed enums for every field name crossing a boundary.
//!
//! # Invariants
//! - Every stored record is identified by a stable `RecordId`.
//! - Core search code only reads records, never mutates them.

pub mod field;
pub mod record;
