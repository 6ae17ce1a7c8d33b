use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use fantasy5_engine::history::History;
use fantasy5_engine::models::Draw;

use crate::models::StoredDraw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    date  TEXT PRIMARY KEY,
    no_1  INTEGER NOT NULL,
    no_2  INTEGER NOT NULL,
    no_3  INTEGER NOT NULL,
    no_4  INTEGER NOT NULL,
    no_5  INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("fantasy5.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Migration failed")?;
    Ok(())
}

/// Appends a draw. Returns `false` when a draw for that date is already stored.
pub fn insert_draw(conn: &Connection, stored: &StoredDraw) -> Result<bool> {
    let n = stored.draw.numbers();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (date, no_1, no_2, no_3, no_4, no_5)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![stored.date, n[0], n[1], n[2], n[3], n[4]],
    ).with_context(|| format!("Insert of draw {} failed", stored.date))?;
    if changed > 0 {
        log::debug!("stored draw {} ({})", stored.date, stored.draw);
    }
    Ok(changed > 0)
}

fn fetch_rows(conn: &Connection, limit: u32) -> Result<Vec<(String, [u8; 5])>> {
    let mut stmt = conn.prepare(
        "SELECT date, no_1, no_2, no_3, no_4, no_5
         FROM draws ORDER BY date DESC LIMIT ?1"
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            [
                row.get::<_, u8>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
            ],
        ))
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The `limit` most recent draws, most recent first.
pub fn fetch_last_draws(conn: &Connection, limit: u32, max_number: u8) -> Result<Vec<StoredDraw>> {
    fetch_rows(conn, limit)?
        .into_iter()
        .map(|(date, numbers)| {
            StoredDraw::new(date.clone(), &numbers, max_number)
                .with_context(|| format!("Stored draw {} is invalid", date))
        })
        .collect()
}

/// Loads the `limit` most recent draws as an analysis history.
pub fn fetch_history(conn: &Connection, limit: u32, max_number: u8) -> Result<History> {
    let draws: Vec<Draw> = fetch_last_draws(conn, limit, max_number)?
        .into_iter()
        .map(|s| s.draw)
        .collect();
    let history = History::from_draws(draws, max_number)?;
    Ok(history)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
