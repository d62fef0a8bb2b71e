//! Catalog record domain model.
//!
//! # Responsibility
//! - Define the canonical disease/autoantibody/autoantigen record.
//! - Validate record invariants before persistence.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another record.
//! - `disease`, `autoantibody` and `autoantigen` are non-empty after trim.
//! - `uniprot_id`, when present, is either `Multiple` or matches
//!   `^[A-Z][0-9A-Z]{5}$`.
//! - Optional text fields are never stored blank; blank means absent.
//! - `additional` is opaque pass-through data; search never reads it.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Sentinel accepted in `uniprot_id` for records mapping to several proteins.
pub const UNIPROT_MULTIPLE: &str = "Multiple";

static UNIPROT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][0-9A-Z]{5}$").expect("valid uniprot regex"));

/// Storage-assigned record identity.
pub type RecordId = Uuid;

/// Provenance and review state attached to every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    /// Free-form origin label (publication, import batch, curator).
    #[serde(default)]
    pub source: String,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub verified: bool,
}

impl RecordMetadata {
    /// Metadata stamped with the current time and an unverified state.
    pub fn now(source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            source: source.into(),
            date_added: now,
            last_updated: now,
            verified: false,
        }
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self::now(String::new())
    }
}

/// One catalog entry linking a disease to an autoantibody and its antigen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Assigned on insert; ignored on import input.
    #[serde(default = "Uuid::nil")]
    pub id: RecordId,
    pub disease: String,
    pub autoantibody: String,
    pub autoantigen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epitope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniprot_id: Option<String>,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub additional: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl Record {
    /// Creates a record with the three required fields and fresh metadata.
    ///
    /// The id stays nil until a store assigns one.
    pub fn new(
        disease: impl Into<String>,
        autoantibody: impl Into<String>,
        autoantigen: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            disease: disease.into(),
            autoantibody: autoantibody.into(),
            autoantigen: autoantigen.into(),
            epitope: None,
            uniprot_id: None,
            kind: None,
            additional: BTreeMap::new(),
            metadata: RecordMetadata::default(),
        }
    }

    pub fn with_epitope(mut self, epitope: impl Into<String>) -> Self {
        self.epitope = Some(epitope.into());
        self
    }

    pub fn with_uniprot_id(mut self, uniprot_id: impl Into<String>) -> Self {
        self.uniprot_id = Some(uniprot_id.into());
        self
    }

    /// Maps blank `epitope`, `uniprot_id` and `kind` values to `None`.
    ///
    /// Imported rows use empty cells for absent values; stores call this
    /// before validating.
    pub fn normalize_optional_fields(&mut self) {
        for value in [&mut self.epitope, &mut self.uniprot_id, &mut self.kind] {
            if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
                *value = None;
            }
        }
    }

    /// Checks record invariants.
    ///
    /// # Errors
    /// - Any required field is blank after trim.
    /// - `uniprot_id` is neither `Multiple` nor a six-character accession.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        for (field, value) in [
            ("disease", &self.disease),
            ("autoantibody", &self.autoantibody),
            ("autoantigen", &self.autoantigen),
        ] {
            if value.trim().is_empty() {
                return Err(RecordValidationError::EmptyRequiredField(field));
            }
        }

        if let Some(uniprot_id) = self.uniprot_id.as_deref() {
            if !is_valid_uniprot_id(uniprot_id) {
                return Err(RecordValidationError::InvalidUniprotId(
                    uniprot_id.to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Returns whether `value` is an accepted UniProt accession or the sentinel.
pub fn is_valid_uniprot_id(value: &str) -> bool {
    value == UNIPROT_MULTIPLE || UNIPROT_ID_RE.is_match(value)
}

/// Record invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Required field is empty after trim.
    EmptyRequiredField(&'static str),
    /// `uniprot_id` does not match the accession format.
    InvalidUniprotId(String),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRequiredField(field) => write!(f, "`{field}` must not be empty"),
            Self::InvalidUniprotId(value) => write!(
                f,
                "invalid uniprotId `{value}`; expected `Multiple` or one uppercase letter followed by 5 alphanumerics"
            ),
        }
    }
}

impl Error for RecordValidationError {}
