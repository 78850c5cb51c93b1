//! Integration tests for the scoped-connection store manager, run against a
//! real database file in a temporary directory.

use personal_library_manager::Library;
use tempfile::TempDir;

fn temp_library() -> (TempDir, Library) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let library =
        Library::with_path(dir.path().join("library.db")).expect("failed to open library store");
    (dir, library)
}

#[test]
fn add_toggle_statistics_flow() {
    let (_dir, library) = temp_library();

    library
        .add("Dune", "Herbert", 1965, "Sci-Fi", false)
        .unwrap();

    let books = library.list_all().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert!(!books[0].read);

    assert_eq!(library.toggle_read("Dune").unwrap(), Some(true));

    let stats = library.statistics().unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.read, 1);
    assert_eq!(stats.percent_read, 100.0);
}

#[test]
fn catalog_survives_reopening_the_store() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db_path = dir.path().join("library.db");

    {
        let library = Library::with_path(db_path.clone()).unwrap();
        library
            .add("The Hobbit", "Tolkien", 1937, "Fantasy", true)
            .unwrap();
    }

    // Re-running initialization against an existing file must not touch rows.
    let reopened = Library::with_path(db_path).unwrap();
    let books = reopened.list_all().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "The Hobbit");
    assert!(books[0].read);
}

#[test]
fn two_managers_on_the_same_path_see_the_same_catalog() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db_path = dir.path().join("library.db");

    let writer = Library::with_path(db_path.clone()).unwrap();
    let reader = Library::with_path(db_path).unwrap();

    writer.add("Emma", "Austen", 1815, "Romance", false).unwrap();

    let books = reader.list_all().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].author, "Austen");
}

#[test]
fn remove_reports_whether_anything_was_deleted() {
    let (_dir, library) = temp_library();
    library
        .add("Dune", "Herbert", 1965, "Sci-Fi", false)
        .unwrap();
    library
        .add("Dune", "Herbert", 1984, "Sci-Fi", true)
        .unwrap();

    assert!(!library.remove("Hyperion").unwrap());
    assert_eq!(library.list_all().unwrap().len(), 2);

    assert!(library.remove("Dune").unwrap());
    assert!(library.list_all().unwrap().is_empty());
}

#[test]
fn search_matches_title_or_author_case_insensitively() {
    let (_dir, library) = temp_library();
    library
        .add("The Hobbit", "Tolkien", 1937, "Fantasy", false)
        .unwrap();
    library
        .add("Dune", "Herbert", 1965, "Sci-Fi", false)
        .unwrap();

    let hits = library.search("hobbit").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "The Hobbit");

    let hits = library.search("TOLKIEN").unwrap();
    assert_eq!(hits.len(), 1);

    assert!(library.search("asimov").unwrap().is_empty());
}

#[test]
fn statistics_on_an_empty_library_are_zero() {
    let (_dir, library) = temp_library();

    let stats = library.statistics().unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.read, 0);
    assert_eq!(stats.percent_read, 0.0);
}
