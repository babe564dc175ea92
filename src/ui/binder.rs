//! Presentation binder: projects repository results into the two category
//! views and turns user actions into repository calls.
//!
//! The binder never owns the collection. Full mutations (load, create, search)
//! rebuild the view from fresh repository data; single-record mutations
//! (toggle, delete, edit commit) patch just the affected item. Both paths must
//! leave the view exactly as a rebuild over the same data would.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{ShelfError, ShelfResult};
use crate::models::{BookRecord, Category};
use crate::repository::Shelf;
use crate::store::Store;

use super::forms::BookForm;

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    pub id: i64,
    pub title: String,
    pub author_line: String,
    pub year_line: String,
    pub toggle_label: &'static str,
    pub is_complete: bool,
}

impl From<&BookRecord> for BookItem {
    fn from(book: &BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author_line: book.author_line(),
            year_line: book.year_line(),
            toggle_label: if book.is_complete {
                "Mark as unread"
            } else {
                "Mark as read"
            },
            is_complete: book.is_complete,
        }
    }
}

/// Single-record change reported back by a repository operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    Updated(BookRecord),
    Removed(i64),
}

/// The two category views plus the search filter they were built with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShelfView {
    incomplete: Vec<BookItem>,
    complete: Vec<BookItem>,
    query: Option<String>,
}

impl ShelfView {
    /// Clear both groups and rebuild them from `books`, which are expected to
    /// already be filtered by `query`.
    pub fn rebuild(&mut self, books: &[BookRecord], query: Option<&str>) {
        self.incomplete.clear();
        self.complete.clear();
        self.query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        for book in books {
            self.group_mut(book.category()).push(BookItem::from(book));
        }
    }

    /// Patch a single item in place. `order` lists the ids of the stored
    /// collection in insertion order; an updated item is slotted in by its rank
    /// there, since stored ids need not be sorted.
    pub fn apply(&mut self, change: &ViewChange, order: &[i64]) {
        match change {
            ViewChange::Removed(id) => self.detach(*id),
            ViewChange::Updated(book) => {
                self.detach(book.id);
                if !self.matches_query(book) {
                    return;
                }
                let ranks: HashMap<i64, usize> = order
                    .iter()
                    .enumerate()
                    .map(|(rank, id)| (*id, rank))
                    .collect();
                let rank_of = |id: i64| ranks.get(&id).copied().unwrap_or(usize::MAX);
                let rank = rank_of(book.id);

                let group = self.group_mut(book.category());
                let position = group.partition_point(|item| rank_of(item.id) < rank);
                group.insert(position, BookItem::from(book));
            }
        }
    }

    pub fn group(&self, category: Category) -> &[BookItem] {
        match category {
            Category::Incomplete => &self.incomplete,
            Category::Complete => &self.complete,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Which group currently shows `id`, if any.
    pub fn locate(&self, id: i64) -> Option<Category> {
        [Category::Incomplete, Category::Complete]
            .into_iter()
            .find(|category| self.group(*category).iter().any(|item| item.id == id))
    }

    pub fn len(&self) -> usize {
        self.incomplete.len() + self.complete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matches_query(&self, book: &BookRecord) -> bool {
        self.query
            .as_deref()
            .map_or(true, |query| book.matches_title(query))
    }

    fn detach(&mut self, id: i64) {
        self.incomplete.retain(|item| item.id != id);
        self.complete.retain(|item| item.id != id);
    }

    fn group_mut(&mut self, category: Category) -> &mut Vec<BookItem> {
        match category {
            Category::Incomplete => &mut self.incomplete,
            Category::Complete => &mut self.complete,
        }
    }
}

/// Whether the shared form is creating a new record or editing one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Viewing,
    Editing { id: i64 },
}

/// Messages the front-end sends to the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderAction {
    /// Full rebuild from the store, keeping the active search.
    Reload,
    /// Create a record, or commit the edit when one is in progress.
    SubmitForm,
    Search(String),
    ToggleCompletion(i64),
    Delete(i64),
    BeginEdit(i64),
    CancelEdit,
}

/// Glue between the repository and the rendered view.
pub struct BookBinder<S: Store> {
    shelf: Shelf<S>,
    view: ShelfView,
    form: BookForm,
    edit: EditState,
}

impl<S: Store> BookBinder<S> {
    /// Build the binder and render the initial view.
    pub fn new(shelf: Shelf<S>) -> ShelfResult<Self> {
        let mut binder = Self {
            shelf,
            view: ShelfView::default(),
            form: BookForm::default(),
            edit: EditState::Viewing,
        };
        binder.dispatch(BinderAction::Reload)?;
        Ok(binder)
    }

    pub fn view(&self) -> &ShelfView {
        &self.view
    }

    pub fn form(&self) -> &BookForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BookForm {
        &mut self.form
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    pub fn shelf(&self) -> &Shelf<S> {
        &self.shelf
    }

    /// Run one user action to completion and return a message for the user.
    pub fn dispatch(&mut self, action: BinderAction) -> ShelfResult<String> {
        debug!("event=binder_dispatch module=ui action={action:?}");
        match action {
            BinderAction::Reload => {
                let query = self.view.query().unwrap_or_default().to_string();
                self.render_search(&query)?;
                Ok(format!("Loaded {} books.", self.view.len()))
            }
            BinderAction::SubmitForm => self.submit_form(),
            BinderAction::Search(query) => {
                self.render_search(&query)?;
                match self.view.query() {
                    Some(query) => Ok(format!(
                        "{} books match \"{query}\".",
                        self.view.len()
                    )),
                    None => Ok("Showing all books.".to_string()),
                }
            }
            BinderAction::ToggleCompletion(id) => {
                let book = self.single(id, |shelf| shelf.toggle_completion(id))?;
                self.patch(ViewChange::Updated(book.clone()))?;
                let moved_to = book.category().heading();
                Ok(format!("Moved \"{}\" to {moved_to}.", book.title))
            }
            BinderAction::Delete(id) => {
                let book = self.single(id, |shelf| shelf.remove(id))?;
                self.patch(ViewChange::Removed(id))?;
                if self.edit == (EditState::Editing { id }) {
                    self.edit = EditState::Viewing;
                    self.form.reset();
                }
                Ok(format!("Deleted \"{}\".", book.title))
            }
            BinderAction::BeginEdit(id) => {
                let book = self.single(id, |shelf| shelf.get(id))?;
                if let EditState::Editing { id: previous } = self.edit {
                    if previous != id {
                        debug!("event=edit_abandoned module=ui id={previous}");
                    }
                }
                self.form = BookForm::from_record(&book);
                self.edit = EditState::Editing { id };
                Ok(format!("Editing {book}."))
            }
            BinderAction::CancelEdit => {
                self.edit = EditState::Viewing;
                self.form.reset();
                Ok("Edit cancelled.".to_string())
            }
        }
    }

    fn submit_form(&mut self) -> ShelfResult<String> {
        let draft = self.form.to_draft();
        let result = match self.edit {
            EditState::Viewing => self.shelf.create(&draft).map(|book| {
                // A new record can land anywhere relative to the active filter,
                // so creation always shows the full collection again.
                (book, None)
            }),
            EditState::Editing { id } => self
                .shelf
                .replace(id, &draft)
                .map(|book| (book, Some(id))),
        };

        match result {
            Ok((book, None)) => {
                self.form.reset();
                self.render_search("")?;
                Ok(format!("Added \"{}\".", book.title))
            }
            Ok((book, Some(_))) => {
                self.form.reset();
                self.edit = EditState::Viewing;
                self.patch(ViewChange::Updated(book.clone()))?;
                Ok(format!("Updated \"{}\".", book.title))
            }
            Err(ShelfError::Validation(message)) => {
                self.form.error = Some(message.clone());
                Err(ShelfError::Validation(message))
            }
            Err(ShelfError::NotFound(id)) => {
                warn!("event=edit_commit module=ui status=not_found id={id}");
                self.edit = EditState::Viewing;
                self.form.reset();
                self.view.apply(&ViewChange::Removed(id), &[]);
                Err(ShelfError::NotFound(id))
            }
            Err(err) => Err(err),
        }
    }

    /// Run a single-record operation; a vanished record is dropped from the
    /// view so it cannot be acted on again.
    fn single<F>(&mut self, id: i64, op: F) -> ShelfResult<BookRecord>
    where
        F: FnOnce(&Shelf<S>) -> ShelfResult<BookRecord>,
    {
        op(&self.shelf).inspect_err(|err| {
            if matches!(err, ShelfError::NotFound(_)) {
                self.view.apply(&ViewChange::Removed(id), &[]);
            }
        })
    }

    /// Apply a single-record change against the current stored order.
    fn patch(&mut self, change: ViewChange) -> ShelfResult<()> {
        let order: Vec<i64> = match change {
            ViewChange::Removed(_) => Vec::new(),
            ViewChange::Updated(_) => self.shelf.all()?.iter().map(|book| book.id).collect(),
        };
        self.view.apply(&change, &order);
        Ok(())
    }

    fn render_search(&mut self, query: &str) -> ShelfResult<()> {
        let books = self.shelf.search(query)?;
        self.view.rebuild(&books, Some(query));
        Ok(())
    }
}
