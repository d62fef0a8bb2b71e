//! Storage contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the read/write interfaces the search engine depends on.
//! - Provide an in-process store and a SQLite store with identical semantics.
//!
//! # Invariants
//! - Write paths enforce `Record::validate()` before persistence.
//! - Storage failures surface unchanged as `StorageError`.

pub mod memory_store;
pub mod sqlite_store;
pub mod storage;
