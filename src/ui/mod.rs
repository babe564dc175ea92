//! Ratatui front-end for the bookshelf. `binder` holds the terminal-agnostic
//! view model; `app` and `terminal` draw it and feed it key presses.

mod app;
pub mod binder;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use binder::{BinderAction, BookBinder, BookItem, EditState, ShelfView, ViewChange};
pub use forms::{BookField, BookForm};
pub use terminal::run_app;
