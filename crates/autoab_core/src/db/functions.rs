//! Scalar SQL functions registered on every catalog connection.
//!
//! # Invariants
//! - `X REGEXP Y` evaluates `regexp(Y, X)` with the same case-insensitive
//!   regex semantics as the in-process predicate matcher.
//! - The compiled pattern is cached per statement argument, so one query
//!   compiles each pattern once.

use crate::search::predicate::contains_regex;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Error};
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub(super) fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: Arc<Regex> = ctx.get_or_create_aux(0, |value| -> Result<_, BoxError> {
                Ok(contains_regex(value.as_str()?)?)
            })?;
            let is_match = {
                let text = ctx
                    .get_raw(1)
                    .as_str()
                    .map_err(|err| Error::UserFunctionError(err.into()))?;
                pattern.is_match(text)
            };
            Ok(is_match)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::register_regexp;
    use rusqlite::Connection;

    #[test]
    fn regexp_is_case_insensitive_substring_match() {
        let conn = Connection::open_in_memory().unwrap();
        register_regexp(&conn).unwrap();

        let matched: bool = conn
            .query_row("SELECT 'Anti-C1q (complement)' REGEXP ?1", [r"c1q \(COMPLEMENT\)"], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(matched);

        let missed: bool = conn
            .query_row("SELECT 'C1q complement' REGEXP ?1", [r"C1q \(complement\)"], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(!missed);
    }
}
