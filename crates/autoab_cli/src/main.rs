//! Command-line front end for the autoantibody catalog.
//!
//! # Responsibility
//! - Map subcommands and flat `key=value` parameters onto core services.
//! - Print JSON (or CSV for `export`) to stdout.

use anyhow::{Context, Result};
use autoab_core::db::open_db;
use autoab_core::{
    default_log_level, init_logging, init_stderr_logging, CatalogParams, CatalogService, Record,
    RecordWriter, SqliteRecordStore,
};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "autoab", version, about = "Query the autoantibody catalog")]
struct Cli {
    /// SQLite catalog file; created and migrated when missing.
    #[arg(long, env = "AUTOAB_DB", default_value = "autoab.sqlite3")]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "AUTOAB_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long, env = "AUTOAB_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bulk-import records from a JSON array.
    Import { file: PathBuf },
    /// Filtered, paginated listing (`search`, `field`, `disease`, `sortBy`, `page`, ...).
    List {
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Relevance-ranked search (`q`, `limit`, `includeStats`).
    Search {
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Cascading facet values for one field.
    Facets {
        field: String,
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// CSV export of every filtered listing record, or of ranked hits with `--ranked`.
    Export {
        #[arg(long)]
        ranked: bool,
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Catalog-wide summary counts.
    Stats,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    match cli.log_dir.as_deref() {
        Some(dir) => init_logging(&level, dir)?,
        None => init_stderr_logging(&level)?,
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open catalog `{}`", cli.db.display()))?;

    match cli.command {
        Command::Import { file } => {
            let reader = BufReader::new(
                File::open(&file).with_context(|| format!("cannot read `{}`", file.display()))?,
            );
            let records: Vec<Record> = serde_json::from_reader(reader)
                .context("import file must be a JSON array of records")?;

            let mut store = SqliteRecordStore::new(&conn);
            let report = store.import_records(&records);
            info!(
                "event=cli_import module=cli status=ok inserted={} failed={}",
                report.inserted,
                report.failed.len()
            );
            print_json(&report)?;
        }
        Command::List { params } => {
            let service = CatalogService::new(SqliteRecordStore::new(&conn));
            print_json(&service.list_with_params(&CatalogParams::from_pairs(params))?)?;
        }
        Command::Search { params } => {
            let service = CatalogService::new(SqliteRecordStore::new(&conn));
            print_json(&service.ranked_search_with_params(&CatalogParams::from_pairs(params))?)?;
        }
        Command::Facets { field, params } => {
            let service = CatalogService::new(SqliteRecordStore::new(&conn));
            let request = CatalogParams::from_pairs(params).facet_request(&field)?;
            print_json(&service.facet_values(&request)?)?;
        }
        Command::Export { ranked, params } => {
            let service = CatalogService::new(SqliteRecordStore::new(&conn));
            let params = CatalogParams::from_pairs(params);
            let csv = if ranked {
                service.export_ranked_csv(&params.ranked_request()?)?
            } else {
                service.export_listing_csv(&params.list_request()?)?
            };
            println!("{csv}");
        }
        Command::Stats => {
            let service = CatalogService::new(SqliteRecordStore::new(&conn));
            print_json(&service.overview()?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_param, Cli};
    use clap::Parser;

    #[test]
    fn parse_param_splits_on_first_equals() {
        assert_eq!(
            parse_param("search=a=b").unwrap(),
            ("search".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_param("q=").unwrap(), ("q".to_string(), String::new()));
        assert!(parse_param("=x").is_err());
        assert!(parse_param("novalue").is_err());
    }

    #[test]
    fn cli_parses_facet_subcommand() {
        let cli = Cli::try_parse_from([
            "autoab",
            "--db",
            "/tmp/catalog.sqlite3",
            "facets",
            "autoantigen",
            "disease=SLE",
        ])
        .unwrap();
        assert_eq!(cli.db.to_str(), Some("/tmp/catalog.sqlite3"));
    }
}
