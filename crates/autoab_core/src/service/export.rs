//! CSV export of listed or ranked records.
//!
//! # Invariants
//! - Header is exactly
//!   `Disease,Autoantibody,Autoantigen,Epitope,UniProt ID,Date Added,Last Updated,Verified`.
//! - A field is quoted, with inner quotes doubled, only when it contains a
//!   comma, a double quote or a newline.
//! - Dates render as `YYYY-MM-DD` (UTC); `Verified` renders as `Yes`/`No`.
//! - Rows are joined with `\n`; there is no trailing newline.

use crate::model::record::Record;
use chrono::{DateTime, Utc};
use std::borrow::Cow;

pub const CSV_HEADER: &str =
    "Disease,Autoantibody,Autoantigen,Epitope,UniProt ID,Date Added,Last Updated,Verified";

/// Renders `records` as CSV text.
pub fn export_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut lines = vec![CSV_HEADER.to_string()];
    lines.extend(records.into_iter().map(csv_row));
    lines.join("\n")
}

fn csv_row(record: &Record) -> String {
    let date_added = format_date(&record.metadata.date_added);
    let last_updated = format_date(&record.metadata.last_updated);
    let fields = [
        record.disease.as_str(),
        record.autoantibody.as_str(),
        record.autoantigen.as_str(),
        record.epitope.as_deref().unwrap_or(""),
        record.uniprot_id.as_deref().unwrap_or(""),
        date_added.as_str(),
        last_updated.as_str(),
        if record.metadata.verified { "Yes" } else { "No" },
    ];

    fields
        .iter()
        .map(|field| escape_csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes `value` only when it contains a delimiter, quote or newline.
pub fn escape_csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn format_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::{escape_csv_field, export_csv, CSV_HEADER};
    use crate::model::record::Record;
    use chrono::{TimeZone, Utc};

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv_field("C1q (complement)"), "C1q (complement)");
    }

    #[test]
    fn export_renders_header_and_rows() {
        let mut record =
            Record::new("Lupus, systemic", "Anti-dsDNA", "dsDNA").with_uniprot_id("Multiple");
        record.metadata.date_added = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        record.metadata.last_updated = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        record.metadata.verified = true;

        let csv = export_csv([&record]);
        assert_eq!(
            csv,
            format!(
                "{CSV_HEADER}\n\"Lupus, systemic\",Anti-dsDNA,dsDNA,,Multiple,2024-03-09,2025-01-01,Yes"
            )
        );
    }

    #[test]
    fn export_of_nothing_is_header_only() {
        assert_eq!(export_csv(std::iter::empty::<&Record>()), CSV_HEADER);
    }
}
