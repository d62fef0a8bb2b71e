//! SQLite-backed record store.
//!
//! # Responsibility
//! - Translate predicates into parameterized SQL over the `records` table.
//! - Decode rows into validated `Record` values.
//!
//! # Invariants
//! - Contains clauses compile to `COALESCE(column, '') REGEXP ?`, using the
//!   connection's `regexp` function; user text only ever travels as a bind
//!   value.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Timestamps are stored as epoch milliseconds.

use crate::model::field::{SearchField, SortField, SortOrder, SortSpec};
use crate::model::record::{Record, RecordId, RecordMetadata};
use crate::repo::storage::{
    ImportFailure, ImportReport, RecordStorage, RecordWriter, StorageError, StorageResult,
};
use crate::search::predicate::Predicate;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;
use std::time::Instant;
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    disease,
    autoantibody,
    autoantigen,
    epitope,
    uniprot_id,
    type,
    additional,
    source,
    date_added,
    last_updated,
    verified
FROM records";

/// SQLite implementation of [`RecordStorage`] and [`RecordWriter`].
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads one record by id.
    pub fn get_record(&self, id: RecordId) -> StorageResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn query_records(&self, sql: &str, bind_values: Vec<Value>) -> StorageResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }
}

impl RecordStorage for SqliteRecordStore<'_> {
    fn find(
        &self,
        predicate: &Predicate,
        sort: SortSpec,
        skip: u64,
        limit: u32,
    ) -> StorageResult<Vec<Record>> {
        let mut bind_values = Vec::new();
        let where_sql = predicate_sql(predicate, &mut bind_values);
        let sql = format!(
            "{RECORD_SELECT_SQL} WHERE {where_sql} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            sort_expression(sort.field),
            order_keyword(sort.order),
        );
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));

        self.query_records(&sql, bind_values)
    }

    fn count(&self, predicate: &Predicate) -> StorageResult<u64> {
        let mut bind_values = Vec::new();
        let where_sql = predicate_sql(predicate, &mut bind_values);
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM records WHERE {where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        u64::try_from(total)
            .map_err(|_| StorageError::InvalidData(format!("negative record count `{total}`")))
    }

    fn distinct(&self, field: SearchField, predicate: &Predicate) -> StorageResult<Vec<String>> {
        let mut bind_values = Vec::new();
        let where_sql = predicate_sql(predicate, &mut bind_values);
        let column = field.column();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {column} FROM records
             WHERE {column} IS NOT NULL AND ({where_sql})
             ORDER BY {column} ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get::<_, String>(0)?);
        }
        Ok(values)
    }

    fn aggregate_ranked(&self, predicate: &Predicate) -> StorageResult<Vec<Record>> {
        let mut bind_values = Vec::new();
        let where_sql = predicate_sql(predicate, &mut bind_values);
        self.query_records(
            &format!("{RECORD_SELECT_SQL} WHERE {where_sql};"),
            bind_values,
        )
    }
}

impl RecordWriter for SqliteRecordStore<'_> {
    fn insert_record(&mut self, record: &Record) -> StorageResult<RecordId> {
        let mut record = record.clone();
        record.normalize_optional_fields();
        record.validate()?;

        let id = Uuid::new_v4();
        let additional = serde_json::to_string(&record.additional)
            .map_err(|err| StorageError::InvalidData(format!("unencodable additional: {err}")))?;

        self.conn.execute(
            "INSERT INTO records (
                id,
                disease,
                autoantibody,
                autoantigen,
                epitope,
                uniprot_id,
                type,
                additional,
                source,
                date_added,
                last_updated,
                verified
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                id.to_string(),
                record.disease.as_str(),
                record.autoantibody.as_str(),
                record.autoantigen.as_str(),
                record.epitope.as_deref(),
                record.uniprot_id.as_deref(),
                record.kind.as_deref(),
                additional,
                record.metadata.source.as_str(),
                record.metadata.date_added.timestamp_millis(),
                record.metadata.last_updated.timestamp_millis(),
                bool_to_int(record.metadata.verified),
            ],
        )?;

        Ok(id)
    }

    /// Imports inside one transaction; a rejected record only skips itself.
    fn import_records(&mut self, records: &[Record]) -> ImportReport {
        let started_at = Instant::now();
        let mut report = ImportReport::default();

        let conn = self.conn;
        let tx = match conn.unchecked_transaction() {
            Ok(tx) => tx,
            Err(err) => {
                warn!(
                    "event=records_import module=repo status=error error_code=tx_begin_failed error={err}"
                );
                report.failed = fail_all(records.len(), &err);
                return report;
            }
        };

        for (index, record) in records.iter().enumerate() {
            match self.insert_record(record) {
                Ok(_) => report.inserted += 1,
                Err(err) => report.failed.push(ImportFailure {
                    index,
                    reason: err.to_string(),
                }),
            }
        }

        if let Err(err) = tx.commit() {
            warn!(
                "event=records_import module=repo status=error error_code=tx_commit_failed error={err}"
            );
            return ImportReport {
                inserted: 0,
                failed: fail_all(records.len(), &err),
            };
        }

        info!(
            "event=records_import module=repo status=ok inserted={} failed={} duration_ms={}",
            report.inserted,
            report.failed.len(),
            started_at.elapsed().as_millis()
        );
        report
    }
}

fn fail_all(len: usize, err: &rusqlite::Error) -> Vec<ImportFailure> {
    let reason = err.to_string();
    (0..len)
        .map(|index| ImportFailure {
            index,
            reason: reason.clone(),
        })
        .collect()
}

/// Renders `predicate` as a SQL boolean expression, appending bind values in
/// placeholder order.
fn predicate_sql(predicate: &Predicate, bind_values: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::MatchAll => "1 = 1".to_string(),
        Predicate::Contains(clause) => {
            bind_values.push(Value::Text(clause.pattern.clone()));
            format!("COALESCE({}, '') REGEXP ?", clause.field.column())
        }
        Predicate::Or(children) => join_children(children, " OR ", "0 = 1", bind_values),
        Predicate::And(children) => join_children(children, " AND ", "1 = 1", bind_values),
    }
}

fn join_children(
    children: &[Predicate],
    separator: &str,
    empty: &str,
    bind_values: &mut Vec<Value>,
) -> String {
    if children.is_empty() {
        return empty.to_string();
    }
    let parts = children
        .iter()
        .map(|child| predicate_sql(child, bind_values))
        .collect::<Vec<_>>();
    format!("({})", parts.join(separator))
}

fn sort_expression(field: SortField) -> String {
    match field {
        SortField::CreatedAt | SortField::UpdatedAt => field.column().to_string(),
        _ => format!("COALESCE({}, '')", field.column()),
    }
}

fn order_keyword(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn parse_record_row(row: &Row<'_>) -> StorageResult<Record> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StorageError::InvalidData(format!("invalid uuid value `{id_text}` in records.id"))
    })?;

    let additional_text: String = row.get("additional")?;
    let additional: BTreeMap<String, String> = serde_json::from_str(&additional_text)
        .map_err(|err| {
            StorageError::InvalidData(format!("invalid json in records.additional: {err}"))
        })?;

    let verified = match row.get::<_, i64>("verified")? {
        0 => false,
        1 => true,
        other => {
            return Err(StorageError::InvalidData(format!(
                "invalid verified value `{other}` in records.verified"
            )));
        }
    };

    let record = Record {
        id,
        disease: row.get("disease")?,
        autoantibody: row.get("autoantibody")?,
        autoantigen: row.get("autoantigen")?,
        epitope: row.get("epitope")?,
        uniprot_id: row.get("uniprot_id")?,
        kind: row.get("type")?,
        additional,
        metadata: RecordMetadata {
            source: row.get("source")?,
            date_added: parse_millis(row.get("date_added")?, "date_added")?,
            last_updated: parse_millis(row.get("last_updated")?, "last_updated")?,
            verified,
        },
    };
    record.validate()?;
    Ok(record)
}

fn parse_millis(value: i64, column: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        StorageError::InvalidData(format!("invalid timestamp `{value}` in records.{column}"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
