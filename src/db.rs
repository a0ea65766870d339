//! SQLite-backed persistence for quota usage windows.
//!
//! Each scheduled run is a fresh process, so daily consumption has to live in
//! an external store. The store is a small SQLite database with one row per
//! (model, granularity) window, opened in WAL mode with a busy timeout so an
//! overlapping reader does not fail outright.

use anyhow::{Context, Result};
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::models::{Granularity, UsageWindow};

/// Resolve the database file path
///
/// Checks `GEMINI_BLOGGEN_DB_PATH` first, falls back to
/// `~/.gemini-bloggen/quota.db`.
pub fn default_db_path() -> Result<PathBuf> {
    if let Ok(custom_path) = env::var("GEMINI_BLOGGEN_DB_PATH") {
        return Ok(PathBuf::from(custom_path));
    }

    let base_dirs = directories::BaseDirs::new().context("Failed to find home directory")?;
    let state_dir = base_dirs.home_dir().join(".gemini-bloggen");

    if !state_dir.exists() {
        fs::create_dir_all(&state_dir)?;
    }

    Ok(state_dir.join("quota.db"))
}

/// Open the store with WAL mode and retry logic
///
/// Retries "database locked" errors a bounded number of times with a growing
/// delay before giving up.
pub fn open(db_path: &Path) -> Result<Connection> {
    let mut attempts = 0;
    let max_attempts = 3;

    loop {
        match Connection::open(db_path) {
            Ok(conn) => {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                init_schema(&conn)?;
                return Ok(conn);
            }
            Err(e) if e.to_string().contains("locked") && attempts < max_attempts => {
                attempts += 1;
                thread::sleep(Duration::from_millis(100 * attempts));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// In-memory store for tests and dry runs
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS usage_windows (
            model TEXT NOT NULL,
            granularity TEXT NOT NULL,
            window_start INTEGER NOT NULL,
            request_count INTEGER NOT NULL,
            token_count INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (model, granularity)
        );",
    )?;
    Ok(())
}

/// Fetch the stored window for a (model, granularity) pair, if any
pub fn get_window(
    conn: &Connection,
    model: &str,
    granularity: Granularity,
) -> Result<Option<UsageWindow>> {
    let row = conn
        .query_row(
            "SELECT window_start, request_count, token_count
             FROM usage_windows WHERE model = ?1 AND granularity = ?2",
            params![model, granularity.as_str()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, i64>(2)? as u64,
                ))
            },
        )
        .optional()?;

    match row {
        Some((start_ms, request_count, token_count)) => {
            let window_start = DateTime::from_timestamp_millis(start_ms)
                .with_context(|| format!("corrupt window_start {start_ms} for {model}"))?;
            Ok(Some(UsageWindow {
                window_start,
                request_count,
                token_count,
            }))
        }
        None => Ok(None),
    }
}

/// Upsert the window row for a (model, granularity) pair
pub fn put_window(
    conn: &Connection,
    model: &str,
    granularity: Granularity,
    window: &UsageWindow,
) -> Result<()> {
    conn.execute(
        "INSERT INTO usage_windows
            (model, granularity, window_start, request_count, token_count, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, strftime('%s','now'))
         ON CONFLICT(model, granularity) DO UPDATE SET
            window_start = excluded.window_start,
            request_count = excluded.request_count,
            token_count = excluded.token_count,
            updated_at = excluded.updated_at",
        params![
            model,
            granularity.as_str(),
            window.window_start.timestamp_millis(),
            window.request_count,
            window.token_count as i64,
        ],
    )?;
    Ok(())
}
