//! Catalog use-case services.
//!
//! # Responsibility
//! - Parse flat request parameters into typed requests.
//! - Orchestrate engine and storage calls into use-case level APIs.
//! - Shape listing pages and CSV exports.

pub mod assembler;
pub mod catalog_service;
pub mod export;
pub mod params;
