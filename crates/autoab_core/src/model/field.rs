//! Typed field names used by search, facets and sorting.
//!
//! # Responsibility
//! - Replace string-keyed field access with closed enums.
//! - Own the external (transport) spelling of every field name.
//!
//! # Invariants
//! - `SearchField::ALL` lists the free-text fields in ranking-weight order.
//! - `FacetField::DEPENDENCY_ORDER` is `disease → autoantibody → autoantigen → epitope`.

use crate::model::record::Record;

/// Record fields reachable by free-text search and contains filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchField {
    Disease,
    Autoantibody,
    Autoantigen,
    Epitope,
    UniprotId,
}

impl SearchField {
    /// Every searchable field, highest ranking weight first.
    pub const ALL: [SearchField; 5] = [
        SearchField::Disease,
        SearchField::Autoantibody,
        SearchField::Autoantigen,
        SearchField::Epitope,
        SearchField::UniprotId,
    ];

    /// External parameter / JSON name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disease => "disease",
            Self::Autoantibody => "autoantibody",
            Self::Autoantigen => "autoantigen",
            Self::Epitope => "epitope",
            Self::UniprotId => "uniprotId",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "disease" => Some(Self::Disease),
            "autoantibody" => Some(Self::Autoantibody),
            "autoantigen" => Some(Self::Autoantigen),
            "epitope" => Some(Self::Epitope),
            "uniprotId" => Some(Self::UniprotId),
            _ => None,
        }
    }

    /// SQLite column backing this field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Disease => "disease",
            Self::Autoantibody => "autoantibody",
            Self::Autoantigen => "autoantigen",
            Self::Epitope => "epitope",
            Self::UniprotId => "uniprot_id",
        }
    }

    /// Reads the field from a record; absent optional fields read as `""`.
    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Self::Disease => record.disease.as_str(),
            Self::Autoantibody => record.autoantibody.as_str(),
            Self::Autoantigen => record.autoantigen.as_str(),
            Self::Epitope => record.epitope.as_deref().unwrap_or(""),
            Self::UniprotId => record.uniprot_id.as_deref().unwrap_or(""),
        }
    }
}

/// Target of a free-text search: one field or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldScope {
    #[default]
    All,
    Only(SearchField),
}

impl FieldScope {
    pub fn parse(value: &str) -> Option<Self> {
        if value == "all" {
            return Some(Self::All);
        }
        SearchField::parse(value).map(Self::Only)
    }
}

/// Fields that can be enumerated as cascading facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetField {
    Disease,
    Autoantibody,
    Autoantigen,
    Epitope,
}

impl FacetField {
    pub const DEPENDENCY_ORDER: [FacetField; 4] = [
        FacetField::Disease,
        FacetField::Autoantibody,
        FacetField::Autoantigen,
        FacetField::Epitope,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "disease" => Some(Self::Disease),
            "autoantibody" => Some(Self::Autoantibody),
            "autoantigen" => Some(Self::Autoantigen),
            "epitope" => Some(Self::Epitope),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.search_field().as_str()
    }

    pub fn search_field(self) -> SearchField {
        match self {
            Self::Disease => SearchField::Disease,
            Self::Autoantibody => SearchField::Autoantibody,
            Self::Autoantigen => SearchField::Autoantigen,
            Self::Epitope => SearchField::Epitope,
        }
    }

    /// Fields whose chosen values may constrain this facet.
    pub fn upstream(self) -> &'static [FacetField] {
        let position = match self {
            Self::Disease => 0,
            Self::Autoantibody => 1,
            Self::Autoantigen => 2,
            Self::Epitope => 3,
        };
        &Self::DEPENDENCY_ORDER[..position]
    }
}

/// Whitelisted listing sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Disease,
    Autoantibody,
    Autoantigen,
    Epitope,
    UniprotId,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parses a requested sort key; anything outside the whitelist is `Disease`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("autoantibody") => Self::Autoantibody,
            Some("autoantigen") => Self::Autoantigen,
            Some("epitope") => Self::Epitope,
            Some("uniprotId") => Self::UniprotId,
            Some("createdAt") => Self::CreatedAt,
            Some("updatedAt") => Self::UpdatedAt,
            _ => Self::Disease,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Disease => "disease",
            Self::Autoantibody => "autoantibody",
            Self::Autoantigen => "autoantigen",
            Self::Epitope => "epitope",
            Self::UniprotId => "uniprot_id",
            Self::CreatedAt => "date_added",
            Self::UpdatedAt => "last_updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` selects descending order; any other value is ascending.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// Sort key plus direction handed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::{FacetField, FieldScope, SearchField, SortField, SortOrder};

    #[test]
    fn facet_upstream_follows_dependency_order() {
        assert!(FacetField::Disease.upstream().is_empty());
        assert_eq!(FacetField::Autoantibody.upstream(), &[FacetField::Disease]);
        assert_eq!(
            FacetField::Epitope.upstream(),
            &[
                FacetField::Disease,
                FacetField::Autoantibody,
                FacetField::Autoantigen
            ]
        );
    }

    #[test]
    fn field_scope_accepts_all_and_named_fields() {
        assert_eq!(FieldScope::parse("all"), Some(FieldScope::All));
        assert_eq!(
            FieldScope::parse("uniprotId"),
            Some(FieldScope::Only(SearchField::UniprotId))
        );
        assert_eq!(FieldScope::parse("Disease"), None);
        assert_eq!(FieldScope::parse("type"), None);
    }

    #[test]
    fn sort_field_falls_back_to_disease() {
        assert_eq!(SortField::parse_or_default(Some("createdAt")), SortField::CreatedAt);
        assert_eq!(SortField::parse_or_default(Some("password")), SortField::Disease);
        assert_eq!(SortField::parse_or_default(None), SortField::Disease);
        assert_eq!(SortOrder::parse_or_default(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("DESC")), SortOrder::Asc);
    }
}
