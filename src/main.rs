//! Binary entry point that glues the SQLite-backed catalog to the TUI. The
//! bootstrapping pipeline is short: open the store (creating the schema when
//! missing), hydrate the initial book list, and drive the Ratatui event loop
//! until the user exits.
use personal_library_manager::{run_app, App, Library};

/// Initialize persistence, load the catalog, and launch the Ratatui event
/// loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let library = Library::open()?;
    let books = library.list_all()?;

    let mut app = App::new(library, books);
    run_app(&mut app)
}
