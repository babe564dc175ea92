//! Error taxonomy shared by the store, the repository and the binder.

use thiserror::Error;

pub type ShelfResult<T> = Result<T, ShelfError>;

#[derive(Debug, Error)]
pub enum ShelfError {
    /// Input rejected before anything was written. The message is shown to the
    /// user as-is.
    #[error("{0}")]
    Validation(String),
    #[error("Book {0} not found.")]
    NotFound(i64),
    /// The newest stored id is already `i64::MAX`, so no later id exists.
    #[error("No ids left after book {0}.")]
    IdsExhausted(i64),
    #[error("storage failure: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("failed to encode bookshelf payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ShelfError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ShelfError::Validation(message.into())
    }

    /// Validation problems belong in the form; everything else goes to the
    /// status line.
    pub fn is_validation(&self) -> bool {
        matches!(self, ShelfError::Validation(_))
    }
}
