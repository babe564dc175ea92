use bookshelf::store::open_database;
use bookshelf::{BookDraft, BookRecord, MemoryStore, Shelf, SqliteStore, Store};
use tempfile::TempDir;

fn record(id: i64, title: &str, year: i32, is_complete: bool) -> BookRecord {
    BookRecord {
        id,
        title: title.to_string(),
        author: "Author".to_string(),
        year,
        is_complete,
    }
}

#[test]
fn collection_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("bookshelf.sqlite");

    {
        let store = SqliteStore::new(open_database(&db_path).unwrap(), "BOOKSHELF_APP");
        let shelf = Shelf::new(store);
        shelf
            .create(&BookDraft::new("Dune", "Herbert", "1965", false))
            .unwrap();
        shelf
            .create(&BookDraft::new("Emma", "Austen", "1815", true))
            .unwrap();
    }

    let reopened = SqliteStore::new(open_database(&db_path).unwrap(), "BOOKSHELF_APP");
    let titles: Vec<_> = reopened
        .load()
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(titles, ["Dune", "Emma"]);
}

#[test]
fn slots_are_isolated_by_key() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("bookshelf.sqlite");

    let first = SqliteStore::new(open_database(&db_path).unwrap(), "FIRST");
    let second = SqliteStore::new(open_database(&db_path).unwrap(), "SECOND");
    first.save(&[record(1, "Only here", 2000, false)]).unwrap();

    assert_eq!(first.load().unwrap().len(), 1);
    assert!(second.load().unwrap().is_empty());
    assert_eq!(second.key(), "SECOND");
}

#[test]
fn save_of_load_is_idempotent() {
    let store = MemoryStore::new();
    store
        .save(&[record(1, "A", 1990, false), record(2, "B", 1991, true)])
        .unwrap();
    let before = store.payload();

    let loaded = store.load().unwrap();
    store.save(&loaded).unwrap();

    assert_eq!(store.payload(), before);
    assert_eq!(store.load().unwrap(), loaded);
}

#[test]
fn legacy_payload_with_text_years_loads() {
    let store = MemoryStore::with_payload(
        r#"[{"id":1700000000000,"title":"Laskar Pelangi","author":"Andrea Hirata","year":"2005","isComplete":false}]"#,
    );
    let books = store.load().unwrap();
    assert_eq!(books[0].year, 2005);

    // Re-saving normalizes the year to a number.
    store.save(&books).unwrap();
    assert!(store.payload().unwrap().contains("\"year\":2005"));
}

#[test]
fn corrupt_payload_starts_an_empty_shelf() {
    let shelf = Shelf::new(MemoryStore::with_payload("[{\"id\":"));
    assert!(shelf.all().unwrap().is_empty());

    let created = shelf
        .create(&BookDraft::new("Fresh", "Start", "2024", false))
        .unwrap();
    assert_eq!(shelf.all().unwrap(), vec![created]);
}

#[test]
fn blank_year_from_an_old_session_survives_the_next_save() {
    let payload = r#"[
        {"id":1,"title":"Keep me","author":"A","year":1999,"isComplete":false},
        {"id":2,"title":"Undated","author":"B","year":null,"isComplete":true}
    ]"#;
    let shelf = Shelf::new(MemoryStore::with_payload(payload));
    assert_eq!(shelf.all().unwrap().len(), 2);

    shelf
        .create(&BookDraft::new("New", "C", "2024", false))
        .unwrap();

    let titles: Vec<String> = shelf.all().unwrap().into_iter().map(|b| b.title).collect();
    assert_eq!(titles, ["Keep me", "Undated", "New"]);
    assert_eq!(shelf.get(2).unwrap().year, 0);
}
