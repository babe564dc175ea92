//! Binary entry point: resolve configuration, start file logging, open the
//! store, render the initial shelves and drive the Ratatui event loop.
use anyhow::Context;
use bookshelf::store::{open_database, open_in_memory};
use bookshelf::{logging, run_app, App, AppConfig, BookBinder, Shelf, SqliteStore};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let _logger = logging::init_logging(&config.log_level, &config.log_dir())?;

    let conn = if config.ephemeral {
        open_in_memory()?
    } else {
        open_database(&config.db_path())?
    };
    let store = SqliteStore::new(conn, config.storage_key.as_str());

    let binder = BookBinder::new(Shelf::new(store)).context("failed to load bookshelf")?;
    let mut app = App::new(binder);
    run_app(&mut app)
}
