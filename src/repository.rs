//! Repository operations over a [`Store`]. Every call loads the full
//! collection, works on a copy, and saves the result before returning, so the
//! store stays the single source of truth.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};

use crate::error::{ShelfError, ShelfResult};
use crate::models::{BookDraft, BookRecord, BookUpdate};
use crate::store::Store;

/// CRUD and search operations for the bookshelf.
pub struct Shelf<S: Store> {
    store: S,
}

impl<S: Store> Shelf<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every record in insertion order.
    pub fn all(&self) -> ShelfResult<Vec<BookRecord>> {
        self.store.load()
    }

    pub fn get(&self, id: i64) -> ShelfResult<BookRecord> {
        self.store
            .load()?
            .into_iter()
            .find(|book| book.id == id)
            .ok_or(ShelfError::NotFound(id))
    }

    /// Validate the draft, append a new record and persist it.
    pub fn create(&self, draft: &BookDraft) -> ShelfResult<BookRecord> {
        let (title, author, year) = parse_draft(draft)?;
        let mut books = self.store.load()?;

        let book = BookRecord {
            id: next_id(&books)?,
            title,
            author,
            year,
            is_complete: draft.is_complete,
        };
        books.push(book.clone());
        self.store.save(&books)?;

        info!(
            "event=book_create module=repo status=ok id={} complete={}",
            book.id, book.is_complete
        );
        Ok(book)
    }

    /// Replace the fields present in `changes`. The id never changes.
    pub fn update(&self, id: i64, changes: BookUpdate) -> ShelfResult<BookRecord> {
        let title = changes.title.as_deref().map(|t| required(t, "Title")).transpose()?;
        let author = changes
            .author
            .as_deref()
            .map(|a| required(a, "Author"))
            .transpose()?;

        let updated = self.mutate(id, "book_update", |book| {
            if let Some(title) = title {
                book.title = title;
            }
            if let Some(author) = author {
                book.author = author;
            }
            if let Some(year) = changes.year {
                book.year = year;
            }
            if let Some(is_complete) = changes.is_complete {
                book.is_complete = is_complete;
            }
        })?;
        Ok(updated)
    }

    /// Full replacement from form input, as the edit form commits it.
    pub fn replace(&self, id: i64, draft: &BookDraft) -> ShelfResult<BookRecord> {
        let (title, author, year) = parse_draft(draft)?;
        self.update(
            id,
            BookUpdate::replace_all(title, author, year, draft.is_complete),
        )
    }

    /// Flip the read flag of one record.
    pub fn toggle_completion(&self, id: i64) -> ShelfResult<BookRecord> {
        self.mutate(id, "book_toggle", |book| {
            book.is_complete = !book.is_complete;
        })
    }

    /// Delete a record, returning what was removed. Unknown ids are an error.
    pub fn remove(&self, id: i64) -> ShelfResult<BookRecord> {
        let mut books = self.store.load()?;
        let Some(index) = books.iter().position(|book| book.id == id) else {
            warn!("event=book_remove module=repo status=not_found id={id}");
            return Err(ShelfError::NotFound(id));
        };
        let removed = books.remove(index);
        self.store.save(&books)?;

        info!("event=book_remove module=repo status=ok id={id}");
        Ok(removed)
    }

    /// Case-insensitive substring search on titles, in insertion order. A
    /// blank query returns the whole collection.
    pub fn search(&self, query: &str) -> ShelfResult<Vec<BookRecord>> {
        let books = self.store.load()?;
        Ok(books
            .into_iter()
            .filter(|book| book.matches_title(query))
            .collect())
    }

    fn mutate<F>(&self, id: i64, event: &str, apply: F) -> ShelfResult<BookRecord>
    where
        F: FnOnce(&mut BookRecord),
    {
        let mut books = self.store.load()?;
        let Some(book) = books.iter_mut().find(|book| book.id == id) else {
            warn!("event={event} module=repo status=not_found id={id}");
            return Err(ShelfError::NotFound(id));
        };
        apply(book);
        let updated = book.clone();
        self.store.save(&books)?;

        info!(
            "event={event} module=repo status=ok id={id} complete={}",
            updated.is_complete
        );
        Ok(updated)
    }
}

/// Validate raw form input into typed fields.
fn parse_draft(draft: &BookDraft) -> ShelfResult<(String, String, i32)> {
    let title = required(&draft.title, "Title")?;
    let author = required(&draft.author, "Author")?;
    let year_raw = required(&draft.year, "Year")?;
    let year = year_raw
        .parse::<i32>()
        .map_err(|_| ShelfError::validation("Year must be a whole number."))?;
    Ok((title, author, year))
}

fn required(value: &str, field: &str) -> ShelfResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ShelfError::validation(format!("{field} is required.")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Creation timestamp in epoch milliseconds, bumped past the newest existing
/// id so two records created within the same millisecond stay distinct.
fn next_id(books: &[BookRecord]) -> ShelfResult<i64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
        .unwrap_or_default();
    match books.iter().map(|book| book.id).max() {
        Some(latest) if latest >= now => latest.checked_add(1).ok_or_else(|| {
            warn!("event=book_create module=repo status=ids_exhausted latest={latest}");
            ShelfError::IdsExhausted(latest)
        }),
        _ => Ok(now),
    }
}
