use std::path::PathBuf;

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{Book, LibraryStats};

use super::books;
use super::connection::{apply_schema, default_db_path, open_connection};

/// Thin manager over the `books` table. The struct stores only the database
/// path; every operation acquires its own connection and releases it on all
/// exit paths when the `Connection` drops. State lives exclusively in the
/// database file, so two `Library` values pointed at the same path see the
/// same catalog.
pub struct Library {
    db_path: PathBuf,
}

impl Library {
    /// Open the store at the default per-user location and make sure the
    /// schema exists.
    pub fn open() -> Result<Self> {
        Self::with_path(default_db_path()?)
    }

    /// Open the store at an explicit path. Integration tests point this at a
    /// temporary directory.
    pub fn with_path(db_path: PathBuf) -> Result<Self> {
        let library = Self { db_path };
        library.initialize()?;
        Ok(library)
    }

    /// Idempotently ensure the schema exists; safe to call on every startup.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        apply_schema(&conn)
    }

    /// Insert a new book and return the stored row. Field validation happens
    /// in the form layer before this is called.
    pub fn add(&self, title: &str, author: &str, year: i64, genre: &str, read: bool) -> Result<Book> {
        let conn = self.connect()?;
        books::insert_book(&conn, title, author, year, genre, read)
    }

    /// Remove every book with this exact title. Returns whether anything was
    /// deleted.
    pub fn remove(&self, title: &str) -> Result<bool> {
        let conn = self.connect()?;
        books::delete_books_by_title(&conn, title)
    }

    /// Case-insensitive substring search over titles and authors.
    pub fn search(&self, query: &str) -> Result<Vec<Book>> {
        let conn = self.connect()?;
        books::search_books(&conn, query)
    }

    /// Flip the read flag on the first book matching this title (lowest id
    /// when duplicates exist). Returns the new status, or `None` when the
    /// title is absent.
    pub fn toggle_read(&self, title: &str) -> Result<Option<bool>> {
        let mut conn = self.connect()?;
        books::toggle_read(&mut conn, title)
    }

    /// Every book in insertion order.
    pub fn list_all(&self) -> Result<Vec<Book>> {
        let conn = self.connect()?;
        books::fetch_all_books(&conn)
    }

    /// Aggregate counts for the statistics view.
    pub fn statistics(&self) -> Result<LibraryStats> {
        let conn = self.connect()?;
        books::fetch_statistics(&conn)
    }

    fn connect(&self) -> Result<Connection> {
        open_connection(&self.db_path)
    }
}
