use std::collections::HashSet;

use bookshelf::{BookDraft, BookUpdate, MemoryStore, Shelf, ShelfError, Store};

fn shelf() -> Shelf<MemoryStore> {
    Shelf::new(MemoryStore::new())
}

fn add(shelf: &Shelf<MemoryStore>, title: &str, read: bool) -> i64 {
    shelf
        .create(&BookDraft::new(title, "Author", "2000", read))
        .unwrap()
        .id
}

#[test]
fn create_then_list_contains_exactly_one_match() {
    let shelf = shelf();
    add(&shelf, "Existing", true);

    let created = shelf
        .create(&BookDraft::new("Dune", "Herbert", "1965", false))
        .unwrap();
    let all = shelf.search("").unwrap();

    let matches: Vec<_> = all
        .iter()
        .filter(|b| b.title == "Dune" && b.author == "Herbert" && b.year == 1965 && !b.is_complete)
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, created.id);
    assert_eq!(all.iter().filter(|b| b.id == created.id).count(), 1);
}

#[test]
fn ids_are_unique_even_in_a_burst() {
    let shelf = shelf();
    let ids: Vec<i64> = (0..50).map(|n| add(&shelf, &format!("Book {n}"), false)).collect();

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn toggle_twice_restores_the_record() {
    let shelf = shelf();
    let id = add(&shelf, "Dune", false);
    let original = shelf.get(id).unwrap();

    let flipped = shelf.toggle_completion(id).unwrap();
    assert!(flipped.is_complete);
    let restored = shelf.toggle_completion(id).unwrap();

    assert_eq!(restored, original);
    assert_eq!(shelf.get(id).unwrap(), original);
}

#[test]
fn removed_record_never_comes_back() {
    let shelf = shelf();
    let keep = add(&shelf, "Keep", false);
    let gone = add(&shelf, "Gone", true);

    let removed = shelf.remove(gone).unwrap();
    assert_eq!(removed.title, "Gone");

    let ids: Vec<_> = shelf.search("").unwrap().iter().map(|b| b.id).collect();
    assert_eq!(ids, [keep]);
}

#[test]
fn unknown_ids_are_not_found() {
    let shelf = shelf();
    add(&shelf, "Dune", false);
    let before = shelf.store().payload();

    assert!(matches!(shelf.remove(42), Err(ShelfError::NotFound(42))));
    assert!(matches!(
        shelf.toggle_completion(42),
        Err(ShelfError::NotFound(42))
    ));
    assert!(matches!(
        shelf.update(42, BookUpdate::default()),
        Err(ShelfError::NotFound(42))
    ));
    assert!(matches!(shelf.get(42), Err(ShelfError::NotFound(42))));
    assert_eq!(shelf.store().payload(), before);
}

#[test]
fn search_ignores_case_and_keeps_insertion_order() {
    let shelf = shelf();
    let first = add(&shelf, "Foo Fighters", false);
    add(&shelf, "Bar", false);
    let second = add(&shelf, "the fOO book", true);

    for query in ["foo", "FOO", "Foo"] {
        let ids: Vec<_> = shelf.search(query).unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, [first, second], "query {query:?}");
    }
    assert!(shelf.search("zzz").unwrap().is_empty());
}

#[test]
fn empty_search_equals_load() {
    let shelf = shelf();
    add(&shelf, "A", false);
    add(&shelf, "B", true);

    assert_eq!(shelf.search("").unwrap(), shelf.store().load().unwrap());
    assert_eq!(shelf.search("  ").unwrap(), shelf.all().unwrap());
}

#[test]
fn blank_title_is_rejected_without_side_effects() {
    let shelf = shelf();
    add(&shelf, "Existing", false);

    let err = shelf
        .create(&BookDraft::new("", "Author", "2000", false))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Title is required.");
    assert_eq!(shelf.all().unwrap().len(), 1);
}

#[test]
fn partial_update_touches_only_given_fields() {
    let shelf = shelf();
    let id = add(&shelf, "Dnue", false);

    let updated = shelf
        .update(
            id,
            BookUpdate {
                title: Some("  Dune ".to_string()),
                ..BookUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, id);
    assert_eq!(updated.title, "Dune");
    assert_eq!(updated.author, "Author");
    assert_eq!(updated.year, 2000);
    assert!(!updated.is_complete);
    assert_eq!(shelf.get(id).unwrap(), updated);
}

#[test]
fn update_rejects_blank_replacement_author() {
    let shelf = shelf();
    let id = add(&shelf, "Dune", false);

    let err = shelf
        .update(
            id,
            BookUpdate {
                author: Some("   ".to_string()),
                ..BookUpdate::default()
            },
        )
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(shelf.get(id).unwrap().author, "Author");
}

#[test]
fn replace_parses_form_input() {
    let shelf = shelf();
    let id = add(&shelf, "Dune", false);

    let replaced = shelf
        .replace(id, &BookDraft::new("Dune Messiah", "Herbert", "1969", true))
        .unwrap();
    assert_eq!(replaced.id, id);
    assert_eq!(replaced.year, 1969);
    assert!(replaced.is_complete);

    let err = shelf
        .replace(id, &BookDraft::new("Dune", "Herbert", "nineteen", true))
        .unwrap_err();
    assert_eq!(err.to_string(), "Year must be a whole number.");
}

#[test]
fn create_after_the_largest_possible_id_fails_cleanly() {
    let payload = format!(
        r#"[{{"id":{},"title":"Last","author":"A","year":2000,"isComplete":false}}]"#,
        i64::MAX
    );
    let shelf = Shelf::new(MemoryStore::with_payload(payload.clone()));

    let err = shelf
        .create(&BookDraft::new("New", "Author", "2001", false))
        .unwrap_err();
    assert!(matches!(err, ShelfError::IdsExhausted(id) if id == i64::MAX));
    assert_eq!(shelf.store().payload(), Some(payload));
}
