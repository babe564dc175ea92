use std::cell::RefCell;

use crate::error::ShelfResult;
use crate::models::BookRecord;

use super::{decode_payload, encode_payload, Store};

/// Store that keeps the serialized payload in memory. It goes through the same
/// JSON codec as the SQLite store, so payload quirks behave identically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payload: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary raw payload, valid or not.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: RefCell::new(Some(payload.into())),
        }
    }

    /// Current raw payload, if anything was ever written.
    pub fn payload(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> ShelfResult<Vec<BookRecord>> {
        Ok(decode_payload("memory", self.payload.borrow().as_deref()))
    }

    fn save(&self, records: &[BookRecord]) -> ShelfResult<()> {
        let encoded = encode_payload(records)?;
        *self.payload.borrow_mut() = Some(encoded);
        Ok(())
    }
}
