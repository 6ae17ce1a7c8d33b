use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use fantasy5_db::rusqlite::Connection;
use std::io::Read;
use std::path::Path;

use fantasy5_db::db::insert_draw;
use fantasy5_db::models::StoredDraw;

const DATE_COLUMN: &str = "date";
const NUMBER_COLUMNS: [&str; 5] = ["NO.1", "NO.2", "NO.3", "NO.4", "NO.5"];

/// Accepts `YYYY/M/D` (with or without zero padding) and `YYYY-MM-DD`, returns `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .with_context(|| format!("Invalid date: '{}'", raw))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

struct Columns {
    date: usize,
    numbers: [usize; 5],
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
    };

    let mut missing = Vec::new();
    let date = find(DATE_COLUMN);
    if date.is_none() {
        missing.push(DATE_COLUMN);
    }
    let mut numbers = [0usize; 5];
    for (slot, name) in numbers.iter_mut().zip(NUMBER_COLUMNS) {
        match find(name) {
            Some(idx) => *slot = idx,
            None => missing.push(name),
        }
    }

    match date {
        Some(date) if missing.is_empty() => Ok(Columns { date, numbers }),
        _ => bail!("CSV is missing columns {:?} (expected: {}, {})", missing, DATE_COLUMN, NUMBER_COLUMNS.join(", ")),
    }
}

fn parse_record(record: &csv::StringRecord, columns: &Columns, max_number: u8) -> Result<StoredDraw> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Missing field at index {}", idx))
    };

    let date = parse_date(get(columns.date)?)?;

    let mut numbers = [0u8; 5];
    for (slot, &idx) in numbers.iter_mut().zip(columns.numbers.iter()) {
        let s = get(idx)?;
        *slot = s
            .parse::<u8>()
            .with_context(|| format!("Cannot parse '{}' (index {})", s, idx))?;
    }

    StoredDraw::new(date, &numbers, max_number)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
    /// Row number and cause of every rejected row.
    pub rejected: Vec<(u32, String)>,
}

impl ImportResult {
    fn reject(&mut self, line: u32, err: anyhow::Error) {
        log::warn!("row {}: {:#}", line, err);
        self.errors += 1;
        self.rejected.push((line, format!("{:#}", err)));
    }
}

pub fn import_csv(conn: &Connection, path: &Path, max_number: u8) -> Result<ImportResult> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;
    import_records(conn, reader, max_number)
}

/// Inserts every valid row. Rows whose date is already stored are skipped;
/// malformed rows are reported and counted, never truncated or repaired.
pub fn import_records<R: Read>(conn: &Connection, mut reader: csv::Reader<R>, max_number: u8) -> Result<ImportResult> {
    let columns = locate_columns(reader.headers().context("Cannot read CSV header")?)?;

    let tx = conn.unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        let line = result.total_records;
        let parsed = record_result
            .context("Unreadable row")
            .and_then(|record| parse_record(&record, &columns, max_number));
        match parsed {
            Ok(draw) => match insert_draw(&tx, &draw) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => result.reject(line, e),
            },
            Err(e) => result.reject(line, e),
        }
    }

    tx.commit().context("Commit failed")?;
    Ok(result)
}
