use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".personal-library-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.db";

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

/// Open a connection to the database file, creating the parent directory on
/// first use. Every store operation calls this and drops the returned
/// connection when it finishes, so the file handle never outlives a single
/// user action.
pub fn open_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    Connection::open(db_path).context("failed to open SQLite database")
}

/// Idempotently ensure the `books` table exists. Safe to run on every
/// startup; existing rows are untouched.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            year INTEGER NOT NULL,
            genre TEXT NOT NULL,
            read INTEGER NOT NULL CHECK(read IN (0, 1))
        )",
        [],
    )
    .context("failed to create books table")?;

    Ok(())
}
