//! Core library surface for the Personal Library Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the SQLite-backed store, the domain types, and the interactive
//! front end.
pub mod db;
pub mod models;
pub mod ui;

/// Convenience re-export for the persistence layer. `main.rs` and the
/// integration tests talk to the store exclusively through this manager.
pub use db::Library;

/// The domain types that other layers manipulate.
pub use models::{Book, LibraryStats};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
