//! Cascading facet resolution.
//!
//! # Responsibility
//! - Enumerate the distinct values one facet may still take given the values
//!   already chosen for facets earlier in the dependency order.
//! - Normalize facet output for selection widgets.
//!
//! # Invariants
//! - Only upstream facets constrain a request; downstream values are ignored.
//! - `epitope` is never enumerated without at least one constraint.
//! - Output has no blank or duplicate entries and is sorted by
//!   case- and accent-insensitive collation.

use crate::model::field::FacetField;
use crate::repo::storage::{RecordStorage, StorageResult};
use crate::search::predicate::Predicate;
use crate::search::query_builder::combine;
use crate::search::sanitize::filter_pattern;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Request for the values of `target` under upstream selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    pub target: FacetField,
    pub disease: Option<String>,
    pub autoantibody: Option<String>,
    pub autoantigen: Option<String>,
}

impl FacetRequest {
    pub fn new(target: FacetField) -> Self {
        Self {
            target,
            disease: None,
            autoantibody: None,
            autoantigen: None,
        }
    }

    fn selected(&self, field: FacetField) -> Option<&str> {
        match field {
            FacetField::Disease => self.disease.as_deref(),
            FacetField::Autoantibody => self.autoantibody.as_deref(),
            FacetField::Autoantigen => self.autoantigen.as_deref(),
            FacetField::Epitope => None,
        }
    }
}

/// Builds the constraint predicate for `request`.
///
/// Returns `None` when the request must resolve to an empty set without
/// touching storage (unconstrained `epitope`).
pub fn facet_predicate(request: &FacetRequest) -> Option<Predicate> {
    let clauses = request
        .target
        .upstream()
        .iter()
        .filter_map(|field| {
            filter_pattern(request.selected(*field))
                .map(|pattern| Predicate::contains(field.search_field(), pattern))
        })
        .collect::<Vec<_>>();

    if request.target == FacetField::Epitope && clauses.is_empty() {
        return None;
    }

    Some(combine(clauses))
}

/// Resolves the sorted distinct values for `request` through `storage`.
pub fn resolve<S>(storage: &S, request: &FacetRequest) -> StorageResult<Vec<String>>
where
    S: RecordStorage + ?Sized,
{
    let Some(predicate) = facet_predicate(request) else {
        return Ok(Vec::new());
    };

    let raw = storage.distinct(request.target.search_field(), &predicate)?;
    Ok(normalize_facet_values(raw))
}

/// Trims, drops blanks, de-duplicates and collates raw facet values.
pub fn normalize_facet_values<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let unique = raw
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>();

    let mut keyed = unique
        .into_iter()
        .map(|value| (collation_key(&value), value))
        .collect::<Vec<_>>();
    keyed.sort_by(|(left_key, left), (right_key, right)| {
        compare_keyed(left_key, left, right_key, right)
    });
    keyed.into_iter().map(|(_, value)| value).collect()
}

/// Base-letter collation key: compatibility decomposition, combining marks
/// removed, lowercased.
pub fn collation_key(value: &str) -> String {
    value
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compares two strings by base letters, ignoring case and accents.
pub fn collate(left: &str, right: &str) -> Ordering {
    compare_keyed(&collation_key(left), left, &collation_key(right), right)
}

fn compare_keyed(left_key: &str, left: &str, right_key: &str, right: &str) -> Ordering {
    // Values equal under collation still need a total order.
    left_key.cmp(right_key).then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
    use super::{collate, facet_predicate, normalize_facet_values, FacetRequest};
    use crate::model::field::{FacetField, SearchField};
    use crate::search::predicate::Predicate;
    use std::cmp::Ordering;

    #[test]
    fn disease_facet_ignores_downstream_values() {
        let mut request = FacetRequest::new(FacetField::Disease);
        request.autoantibody = Some("Anti-Sm".into());
        assert_eq!(facet_predicate(&request), Some(Predicate::MatchAll));
    }

    #[test]
    fn autoantigen_facet_uses_both_upstream_constraints() {
        let mut request = FacetRequest::new(FacetField::Autoantigen);
        request.disease = Some("SLE".into());
        request.autoantibody = Some("Anti-(Sm)".into());
        request.autoantigen = Some("ignored".into());

        assert_eq!(
            facet_predicate(&request),
            Some(Predicate::And(vec![
                Predicate::contains(SearchField::Disease, "SLE"),
                Predicate::contains(SearchField::Autoantibody, r"Anti-\(Sm\)"),
            ]))
        );
    }

    #[test]
    fn unconstrained_epitope_is_short_circuited() {
        let mut request = FacetRequest::new(FacetField::Epitope);
        request.disease = Some("  ".into());
        assert_eq!(facet_predicate(&request), None);

        request.autoantigen = Some("Ro60".into());
        assert_eq!(
            facet_predicate(&request),
            Some(Predicate::contains(SearchField::Autoantigen, "Ro60"))
        );
    }

    #[test]
    fn normalize_trims_dedups_and_collates() {
        let values = normalize_facet_values(vec![
            "beta".to_string(),
            " Alpha ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "alpha".to_string(),
            "Alpha".to_string(),
            "Érable".to_string(),
            "delta".to_string(),
        ]);
        assert_eq!(values, ["Alpha", "alpha", "beta", "delta", "Érable"]);
    }

    #[test]
    fn collate_groups_by_base_letter() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Zebra", "apple"), Ordering::Greater);
        assert_eq!(collate("éclair", "Eclipse"), Ordering::Less);
    }
}
