use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Book, LibraryStats};

/// Fetch every book ordered by id, which is insertion order. The home view
/// renders exactly this list.
pub fn fetch_all_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, author, year, genre, read
             FROM books
             ORDER BY id",
        )
        .context("failed to prepare all books query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                year: row.get(3)?,
                genre: row.get(4)?,
                read: row.get(5)?,
            })
        })
        .context("failed to iterate books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// Insert a brand new book. We echo the hydrated struct so callers can update
/// UI state without having to re-query the database.
pub fn insert_book(
    conn: &Connection,
    title: &str,
    author: &str,
    year: i64,
    genre: &str,
    read: bool,
) -> Result<Book> {
    conn.execute(
        "INSERT INTO books (title, author, year, genre, read) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![title, author, year, genre, read],
    )
    .context("failed to insert book")?;

    let id = conn.last_insert_rowid();
    Ok(Book {
        id,
        title: title.to_string(),
        author: author.to_string(),
        year,
        genre: genre.to_string(),
        read,
    })
}

/// Delete every row whose title matches exactly. Returns whether at least one
/// row was removed; a miss is not an error, the UI turns `false` into a
/// footer warning.
pub fn delete_books_by_title(conn: &Connection, title: &str) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM books WHERE title = ?1", params![title])
        .context("failed to delete books")?;

    Ok(deleted > 0)
}

/// Case-insensitive substring search over title and author. An empty result
/// set is a normal outcome, never an error.
pub fn search_books(conn: &Connection, query: &str) -> Result<Vec<Book>> {
    let pattern = format!("%{}%", query.to_lowercase());

    let mut stmt = conn
        .prepare(
            "SELECT id, title, author, year, genre, read
             FROM books
             WHERE LOWER(title) LIKE ?1 OR LOWER(author) LIKE ?1
             ORDER BY id",
        )
        .context("failed to prepare search query")?;

    let books = stmt
        .query_map([pattern], |row| {
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                year: row.get(3)?,
                genre: row.get(4)?,
                read: row.get(5)?,
            })
        })
        .context("failed to iterate search results")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect search results")?;

    Ok(books)
}

/// Flip the read flag on the first title match, lowest id first so duplicate
/// titles behave reproducibly. The lookup and update run in one transaction.
/// Returns the new status, or `None` when no row matches.
pub fn toggle_read(conn: &mut Connection, title: &str) -> Result<Option<bool>> {
    let tx = conn
        .transaction()
        .context("failed to begin toggle transaction")?;

    let target = tx
        .query_row(
            "SELECT id, read FROM books WHERE title = ?1 ORDER BY id LIMIT 1",
            params![title],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?)),
        )
        .optional()
        .context("failed to look up book for toggle")?;

    let (id, read) = match target {
        Some(found) => found,
        None => return Ok(None),
    };

    let new_status = !read;
    tx.execute(
        "UPDATE books SET read = ?1 WHERE id = ?2",
        params![new_status, id],
    )
    .context("failed to update read status")?;

    tx.commit().context("failed to commit toggle")?;
    Ok(Some(new_status))
}

/// Compute the aggregate numbers for the statistics view. The percentage
/// falls back to zero for an empty library instead of dividing by zero.
pub fn fetch_statistics(conn: &Connection) -> Result<LibraryStats> {
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .context("failed to count books")?;

    let read: i64 = conn
        .query_row("SELECT COUNT(*) FROM books WHERE read = 1", [], |row| {
            row.get(0)
        })
        .context("failed to count read books")?;

    let percent_read = if total > 0 {
        read as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    Ok(LibraryStats {
        total,
        read,
        percent_read,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::apply_schema;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory database");
        apply_schema(&conn).expect("failed to apply schema");
        conn
    }

    #[test]
    fn add_then_list_returns_the_new_row() {
        let conn = memory_conn();

        let added = insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();
        let books = fetch_all_books(&conn).unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0], added);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].author, "Herbert");
        assert_eq!(books[0].year, 1965);
        assert_eq!(books[0].genre, "Sci-Fi");
        assert!(!books[0].read);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let conn = memory_conn();

        insert_book(&conn, "Zebra", "A", 2000, "Misc", false).unwrap();
        insert_book(&conn, "Apple", "Z", 2001, "Misc", false).unwrap();

        let titles: Vec<_> = fetch_all_books(&conn)
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Zebra", "Apple"]);
    }

    #[test]
    fn remove_missing_title_leaves_table_unchanged() {
        let conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();

        let removed = delete_books_by_title(&conn, "Hyperion").unwrap();

        assert!(!removed);
        assert_eq!(fetch_all_books(&conn).unwrap().len(), 1);
    }

    #[test]
    fn remove_deletes_every_exact_title_match() {
        let conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();
        insert_book(&conn, "Dune", "Herbert", 1984, "Sci-Fi", true).unwrap();
        insert_book(&conn, "Hyperion", "Simmons", 1989, "Sci-Fi", false).unwrap();

        let removed = delete_books_by_title(&conn, "Dune").unwrap();

        assert!(removed);
        let remaining = fetch_all_books(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Hyperion");
    }

    #[test]
    fn toggling_twice_restores_the_original_status() {
        let mut conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();

        assert_eq!(toggle_read(&mut conn, "Dune").unwrap(), Some(true));
        assert_eq!(toggle_read(&mut conn, "Dune").unwrap(), Some(false));
        assert!(!fetch_all_books(&conn).unwrap()[0].read);
    }

    #[test]
    fn toggle_missing_title_returns_none() {
        let mut conn = memory_conn();
        assert_eq!(toggle_read(&mut conn, "Dune").unwrap(), None);
    }

    #[test]
    fn toggle_with_duplicate_titles_hits_the_lowest_id() {
        let mut conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();
        insert_book(&conn, "Dune", "Herbert", 1984, "Sci-Fi", false).unwrap();

        assert_eq!(toggle_read(&mut conn, "Dune").unwrap(), Some(true));

        let books = fetch_all_books(&conn).unwrap();
        assert!(books[0].read);
        assert!(!books[1].read);
    }

    #[test]
    fn search_is_case_insensitive_and_substring_based() {
        let conn = memory_conn();
        insert_book(&conn, "The Hobbit", "Tolkien", 1937, "Fantasy", true).unwrap();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();

        let by_title = search_books(&conn, "hobbit").unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "The Hobbit");

        let by_author = search_books(&conn, "HERB").unwrap();
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].title, "Dune");
    }

    #[test]
    fn search_with_no_match_returns_empty() {
        let conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();

        assert!(search_books(&conn, "tolkien").unwrap().is_empty());
    }

    #[test]
    fn statistics_on_empty_library_are_all_zero() {
        let conn = memory_conn();

        let stats = fetch_statistics(&conn).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.read, 0);
        assert_eq!(stats.percent_read, 0.0);
    }

    #[test]
    fn statistics_count_read_books_and_percentage() {
        let mut conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", false).unwrap();

        toggle_read(&mut conn, "Dune").unwrap();

        let stats = fetch_statistics(&conn).unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.read, 1);
        assert_eq!(stats.percent_read, 100.0);
    }

    #[test]
    fn statistics_with_a_mixed_library() {
        let conn = memory_conn();
        insert_book(&conn, "Dune", "Herbert", 1965, "Sci-Fi", true).unwrap();
        insert_book(&conn, "Hyperion", "Simmons", 1989, "Sci-Fi", false).unwrap();
        insert_book(&conn, "The Hobbit", "Tolkien", 1937, "Fantasy", true).unwrap();
        insert_book(&conn, "Emma", "Austen", 1815, "Romance", false).unwrap();

        let stats = fetch_statistics(&conn).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.read, 2);
        assert_eq!(stats.percent_read, 50.0);
    }
}
