//! Loads the CSV extracts into the normalized source schema.
//!
//! Every file is read fully into a [`Frame`], lightly coerced, then appended
//! to its table inside one transaction. A file that fails is logged and
//! skipped; the remaining files are still loaded.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{Connection, ToSql, params, params_from_iter};
use tracing::{error, info, warn};

use crate::error::{Error, Result};

/// One entry of the fixed file-to-table manifest.
#[derive(Debug, Clone, Copy)]
pub struct CsvSource {
    pub file_name: &'static str,
    pub table: &'static str,
}

/// Extracts in load order: referenced tables come before the tables whose
/// foreign keys point at them.
pub const MANIFEST: &[CsvSource] = &[
    CsvSource { file_name: "circuit_ok.csv", table: "circuits" },
    CsvSource { file_name: "race_ok.csv", table: "races" },
    CsvSource { file_name: "drivers_ok.csv", table: "drivers" },
    CsvSource { file_name: "constructors_ok.csv", table: "constructors" },
    CsvSource { file_name: "constructor_results_ok.csv", table: "constructor_results" },
    CsvSource { file_name: "constructor_standings_ok.csv", table: "constructor_standings" },
    CsvSource { file_name: "driver_standings_ok.csv", table: "driver_standings" },
    CsvSource { file_name: "results_ok.csv", table: "results" },
    CsvSource { file_name: "lap_times_ok.csv", table: "lap_times" },
    CsvSource { file_name: "pit_stops_ok.csv", table: "pit_stops" },
    CsvSource { file_name: "qualifying_ok.csv", table: "qualifying" },
    CsvSource { file_name: "seasons_ok.csv", table: "seasons" },
    CsvSource { file_name: "status_ok.csv", table: "status" },
];

const DATE_COLUMNS: &[&str] = &["date", "dob"];
const NUMERIC_COLUMNS: &[&str] = &["number", "position", "milliseconds", "fastestLap", "rank"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(s.as_str().into()),
        })
    }
}

/// A CSV file held in memory: the header and every row, cell by cell.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub table: String,
    pub file: PathBuf,
    pub rows_read: usize,
    pub rows_inserted: usize,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file: PathBuf,
    pub table: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub loaded: Vec<LoadReport>,
    pub skipped: Vec<SkippedFile>,
}

/// Reads a CSV file with a header row. Empty fields become [`Cell::Null`].
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())?;

    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Frame { columns, rows })
}

/// Drops index columns left behind by dataframe exports: a leading column
/// with an empty header or one named `Unnamed: 0`, then any remaining
/// `Unnamed: N` column from a re-export.
/// Returns whether a column was dropped.
pub fn drop_index_column(frame: &mut Frame) -> bool {
    let leading = frame
        .columns
        .first()
        .is_some_and(|name| name.is_empty() || is_unnamed(name));

    let drop: Vec<usize> = frame
        .columns
        .iter()
        .enumerate()
        .filter(|(idx, name)| (*idx == 0 && leading) || is_unnamed(name))
        .map(|(idx, _)| idx)
        .collect();

    if drop.is_empty() {
        return false;
    }

    // highest index first so earlier positions stay valid
    for &idx in drop.iter().rev() {
        frame.columns.remove(idx);
        for row in &mut frame.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
    }
    true
}

fn is_unnamed(name: &str) -> bool {
    name.starts_with("Unnamed")
}

/// Normalizes date columns to ISO dates and parses numeric columns.
/// Values that cannot be coerced become [`Cell::Null`].
pub fn coerce(frame: &mut Frame) {
    for (idx, column) in frame.columns.iter().enumerate() {
        let convert: fn(&str) -> Cell = if DATE_COLUMNS.contains(&column.as_str()) {
            normalize_date
        } else if NUMERIC_COLUMNS.contains(&column.as_str()) {
            parse_number
        } else {
            continue;
        };

        for row in &mut frame.rows {
            if let Some(Cell::Text(s)) = row.get(idx) {
                let coerced = convert(s);
                row[idx] = coerced;
            }
        }
    }
}

fn normalize_date(s: &str) -> Cell {
    parse_date(s).map_or(Cell::Null, |d| Cell::Text(d.format("%Y-%m-%d").to_string()))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn parse_number(s: &str) -> Cell {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Integer(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Cell::Real(f),
        _ => Cell::Null,
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map(params![table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(Error::UnknownTable(table.to_string()));
    }
    Ok(columns)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Appends every row of `frame` to `table` in a single transaction.
pub fn insert_frame(conn: &Connection, table: &str, frame: &Frame) -> Result<usize> {
    let known = table_columns(conn, table)?;
    for column in &frame.columns {
        if !known.iter().any(|k| k.eq_ignore_ascii_case(column)) {
            return Err(Error::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            });
        }
    }

    let columns: Vec<String> = frame.columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    );

    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&sql)?;
        for row in &frame.rows {
            inserted += stmt.execute(params_from_iter(row.iter()))?;
        }
    }
    tx.commit()?;

    Ok(inserted)
}

/// Reads, cleans and appends one CSV file to `table`.
pub fn load_file<P: AsRef<Path>>(conn: &Connection, path: P, table: &str) -> Result<LoadReport> {
    let path = path.as_ref();
    let mut frame = read_table(path)?;

    if drop_index_column(&mut frame) {
        tracing::debug!(file = %path.display(), "dropped leading index column");
    }
    coerce(&mut frame);

    let rows_inserted = insert_frame(conn, table, &frame)?;

    Ok(LoadReport {
        table: table.to_string(),
        file: path.to_path_buf(),
        rows_read: frame.rows.len(),
        rows_inserted,
    })
}

/// Loads every manifest file found in `dir`. Failures are logged and skipped.
pub fn load_all<P: AsRef<Path>>(conn: &Connection, dir: P) -> LoadSummary {
    let dir = dir.as_ref();
    let mut summary = LoadSummary::default();

    for source in MANIFEST {
        let path = dir.join(source.file_name);

        if !path.exists() {
            warn!("File {} does not exist, skipping", path.display());
            summary.skipped.push(SkippedFile {
                file: path,
                table: source.table.to_string(),
                reason: "file does not exist".to_string(),
            });
            continue;
        }

        match load_file(conn, &path, source.table) {
            Ok(report) => {
                info!(
                    table = source.table,
                    rows = report.rows_inserted,
                    "Loaded {} into {}",
                    path.display(),
                    source.table
                );
                summary.loaded.push(report);
            }
            Err(e) => {
                error!("Failed to load {} into {}: {e}", path.display(), source.table);
                summary.skipped.push(SkippedFile {
                    file: path,
                    table: source.table.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    summary
}
