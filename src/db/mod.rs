//! Persistence module split across logical submodules.

mod books;
mod connection;
mod library;

pub use books::{
    delete_books_by_title, fetch_all_books, fetch_statistics, insert_book, search_books,
    toggle_read,
};
pub use connection::{apply_schema, default_db_path, open_connection};
pub use library::Library;
