use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::store::{ListingStore, StoreError};

const SQL_CREATE: &str = "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)";
const SQL_GET: &str = "SELECT value FROM kv WHERE key = ?1";
const SQL_SET: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2) \
                       ON CONFLICT(key) DO UPDATE SET value = excluded.value";
// substr/length instead of LIKE so `%` and `_` inside keys match literally.
const SQL_SCAN: &str =
    "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key";

/// Single-table SQLite key-value store.
pub struct SqliteListingStore {
    conn: Mutex<Connection>,
}

impl SqliteListingStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SQL_CREATE, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection mutex poisoned".to_string()))
    }
}

impl std::fmt::Debug for SqliteListingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteListingStore").finish_non_exhaustive()
    }
}

impl ListingStore for SqliteListingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn()?;
        let value = conn
            .query_row(SQL_GET, params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(SQL_SET, params![key, value])?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(SQL_SCAN)?;
        let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upserts_and_reads_back() {
        let store = SqliteListingStore::in_memory().expect("open");
        assert_eq!(store.get("missing").expect("get"), None);

        store.set("k", "1").expect("insert");
        store.set("k", "2").expect("update");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("2"));
    }

    #[test]
    fn scan_treats_wildcards_literally() {
        let store = SqliteListingStore::in_memory().expect("open");
        for key in ["ns:listings/a_1", "ns:listings/ab1", "ns:listings%x", "ns:other"] {
            store.set(key, "v").expect("set");
        }

        assert_eq!(
            store.scan_prefix("ns:listings/a_").expect("scan"),
            vec!["ns:listings/a_1"]
        );
        assert_eq!(
            store.scan_prefix("ns:listings/").expect("scan"),
            vec!["ns:listings/a_1", "ns:listings/ab1"]
        );
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("listings.db");

        {
            let store = SqliteListingStore::open(&path).expect("open");
            store.set("house-search:listings/a", "{}").expect("set");
        }

        let reopened = SqliteListingStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("house-search:listings/a").expect("get").as_deref(),
            Some("{}")
        );
    }
}
