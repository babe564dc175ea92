//! Persistence of the book collection, split across logical submodules.
//!
//! The whole collection lives in one named slot as a JSON array. Loads and
//! saves always move the full list; there is a single writer per session.

mod connection;
mod memory;
mod sqlite;

use log::warn;
use serde_json::Value;

use crate::error::ShelfResult;
use crate::models::BookRecord;

pub use connection::{open_database, open_in_memory};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Slot name used when nothing else is configured.
pub const DEFAULT_STORAGE_KEY: &str = "BOOKSHELF_APP";

/// Load/save contract over the durable slot.
pub trait Store {
    /// Return the persisted collection. Missing or malformed payloads yield an
    /// empty list; only a failing storage medium is an error.
    fn load(&self) -> ShelfResult<Vec<BookRecord>>;

    /// Replace the persisted collection with `records`.
    fn save(&self, records: &[BookRecord]) -> ShelfResult<()>;
}

/// Decode a slot payload, degrading to an empty collection on bad input.
/// Records are decoded one by one, so a single unreadable entry is skipped
/// instead of taking the rest of the shelf down with it.
pub(crate) fn decode_payload(key: &str, payload: Option<&str>) -> Vec<BookRecord> {
    let Some(raw) = payload else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let entries = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("event=store_load module=store status=corrupt key={key} error={err}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value::<BookRecord>(entry)
                .inspect_err(|err| {
                    warn!(
                        "event=store_load module=store status=skipped_record key={key} index={index} error={err}"
                    );
                })
                .ok()
        })
        .collect()
}

pub(crate) fn encode_payload(records: &[BookRecord]) -> ShelfResult<String> {
    Ok(serde_json::to_string(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_payload_is_empty() {
        assert!(decode_payload("k", None).is_empty());
        assert!(decode_payload("k", Some("  ")).is_empty());
    }

    #[test]
    fn malformed_payload_degrades_to_empty() {
        assert!(decode_payload("k", Some("{not json")).is_empty());
        assert!(decode_payload("k", Some("null")).is_empty());
        assert!(decode_payload("k", Some(r#"[{"id":1}]"#)).is_empty());
    }

    #[test]
    fn unreadable_record_does_not_drop_its_neighbours() {
        let raw = r#"[
            {"id":1,"title":"Keep me","author":"x","year":2001,"isComplete":false},
            {"id":2,"title":"Broken","author":"y","year":"soon","isComplete":false},
            {"id":3,"title":"No year","author":"z","year":null,"isComplete":true}
        ]"#;
        let records = decode_payload("k", Some(raw));
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Keep me", "No year"]);
        assert_eq!(records[1].year, 0);
    }

    #[test]
    fn payload_keeps_records_in_order() {
        let raw = r#"[
            {"id":2,"title":"B","author":"x","year":2001,"isComplete":false},
            {"id":1,"title":"A","author":"y","year":"1999","isComplete":true}
        ]"#;
        let records = decode_payload("k", Some(raw));
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(records[1].year, 1999);
    }
}
