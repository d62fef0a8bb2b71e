//! Literal-match escaping for user supplied filter text.
//!
//! # Invariants
//! - Every regex metacharacter in `. * + ? ^ $ { } ( ) | [ ] \` gains one
//!   leading backslash; all other characters pass through unchanged.
//! - Escaping is not idempotent: escaping twice doubles the backslashes.
//! - Blank input never becomes a pattern (see [`filter_pattern`]).

const REGEX_METACHARACTERS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Escapes `raw` so it can be embedded as a literal regex fragment.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if REGEX_METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Turns an optional user value into an escaped pattern.
///
/// Returns `None` for missing, empty or whitespace-only input so callers omit
/// the clause instead of matching everything. Surrounding whitespace is
/// trimmed before escaping.
pub fn filter_pattern(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(escape(trimmed))
}

#[cfg(test)]
mod tests {
    use super::{escape, filter_pattern};
    use regex::RegexBuilder;

    #[test]
    fn escape_prefixes_every_metacharacter() {
        assert_eq!(escape(r".*+?^${}()|[]\"), r"\.\*\+\?\^\$\{\}\(\)\|\[\]\\");
        assert_eq!(escape("Anti-dsDNA"), "Anti-dsDNA");
    }

    #[test]
    fn escape_parenthesised_value_matches_literally() {
        let escaped = escape("C1q (complement)");
        assert_eq!(escaped, r"C1q \(complement\)");

        let re = RegexBuilder::new(&escaped)
            .case_insensitive(true)
            .build()
            .expect("escaped text should compile");
        assert!(re.is_match("Anti-C1q (complement) antibodies"));
        assert!(!re.is_match("C1q complement"));
    }

    #[test]
    fn escape_is_not_idempotent() {
        let once = escape("a.b");
        let twice = escape(&once);
        assert_eq!(once, r"a\.b");
        assert_eq!(twice, r"a\\\.b");
        assert_ne!(once, twice);

        // Text without metacharacters is unaffected by repetition.
        assert_eq!(escape(&escape("lupus")), "lupus");
    }

    #[test]
    fn blank_values_produce_no_pattern() {
        assert_eq!(filter_pattern(None), None);
        assert_eq!(filter_pattern(Some("")), None);
        assert_eq!(filter_pattern(Some(" \t ")), None);
        assert_eq!(filter_pattern(Some("  SLE ")).as_deref(), Some("SLE"));
    }
}
