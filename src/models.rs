//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so other
//! layers can focus on presentation and persistence logic.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// In-memory representation of one catalog entry. The struct mirrors rows in
/// the `books` table one-to-one.
pub struct Book {
    /// Primary key from the SQLite store. Assigned on insert and never
    /// changed afterwards; remove/toggle flows bubble it back to the
    /// persistence layer when they need a stable reference.
    pub id: i64,
    /// Title displayed in lists and search results. Duplicates are allowed.
    pub title: String,
    /// Author field used both for display and substring search.
    pub author: String,
    /// Publication year. Kept as an integer so the form layer can range-check
    /// it (1000-9999) without string parsing downstream.
    pub year: i64,
    /// Free-form genre label.
    pub genre: String,
    /// Whether the user has finished this book.
    pub read: bool,
}

impl Book {
    /// Compose a `Title - Author` string that gracefully omits the hyphen if
    /// the author is blank. List rows and search results rely on this
    /// ready-to-use formatting.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }

    /// Short read-state marker shown next to each list row.
    pub fn read_marker(&self) -> &'static str {
        if self.read {
            "[read]"
        } else {
            "[unread]"
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Aggregate numbers for the statistics view.
pub struct LibraryStats {
    /// Total number of rows in the `books` table.
    pub total: i64,
    /// Rows with `read = 1`.
    pub read: i64,
    /// `read / total * 100`, or `0.0` for an empty library so the view never
    /// divides by zero.
    pub percent_read: f64,
}
