//! Core library surface for the bookshelf tracker.
//!
//! The binary only wires these pieces together: configuration, logging, a
//! [`Store`] for the persisted collection, the [`Shelf`] repository on top of
//! it, and the terminal front-end.
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod store;
pub mod ui;

pub use config::AppConfig;
pub use error::{ShelfError, ShelfResult};
pub use models::{BookDraft, BookRecord, BookUpdate, Category};
pub use repository::Shelf;
pub use store::{MemoryStore, SqliteStore, Store, DEFAULT_STORAGE_KEY};
pub use ui::{run_app, App, BinderAction, BookBinder, ShelfView};
