use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ShelfResult;
use crate::models::BookRecord;

use super::{decode_payload, encode_payload, Store};

/// Store backed by one row of the `slots` table.
pub struct SqliteStore {
    conn: Connection,
    key: String,
}

impl SqliteStore {
    /// Wrap a connection whose schema has already been ensured (see
    /// [`super::open_database`]).
    pub fn new(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_payload(&self) -> ShelfResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM slots WHERE key = ?1",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }
}

impl Store for SqliteStore {
    fn load(&self) -> ShelfResult<Vec<BookRecord>> {
        let payload = self.read_payload().inspect_err(|err| {
            error!("event=store_load module=store status=error key={} error={err}", self.key);
        })?;
        let records = decode_payload(&self.key, payload.as_deref());
        debug!(
            "event=store_load module=store status=ok key={} count={}",
            self.key,
            records.len()
        );
        Ok(records)
    }

    fn save(&self, records: &[BookRecord]) -> ShelfResult<()> {
        let payload = encode_payload(records)?;
        self.conn
            .execute(
                "INSERT INTO slots (key, payload) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET payload = excluded.payload",
                params![self.key, payload],
            )
            .inspect_err(|err| {
                error!("event=store_save module=store status=error key={} error={err}", self.key);
            })?;
        debug!(
            "event=store_save module=store status=ok key={} count={}",
            self.key,
            records.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_in_memory;

    fn record(id: i64, title: &str) -> BookRecord {
        BookRecord {
            id,
            title: title.to_string(),
            author: "Anon".to_string(),
            year: 2000,
            is_complete: false,
        }
    }

    #[test]
    fn empty_slot_loads_as_empty() {
        let store = SqliteStore::new(open_in_memory().unwrap(), "TEST");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_previous_payload() {
        let store = SqliteStore::new(open_in_memory().unwrap(), "TEST");
        store.save(&[record(1, "One"), record(2, "Two")]).unwrap();
        store.save(&[record(3, "Three")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![record(3, "Three")]);
    }

    #[test]
    fn corrupt_row_degrades_to_empty() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO slots (key, payload) VALUES ('TEST', 'oops')",
            [],
        )
        .unwrap();
        let store = SqliteStore::new(conn, "TEST");
        assert!(store.load().unwrap().is_empty());
    }
}
