//! SQLite-backed key-value store
//!
//! A single `kv` table keyed by the full string key. Prefix scans compare the
//! leading substring rather than using LIKE so `%` and `_` in paths are
//! matched literally.

use crate::errors::{from_rusqlite, Result};
use crate::kv::backend::KvBackend;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
)";

pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open (creating if needed) a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(from_rusqlite)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure(&conn)?;
        conn.execute(SCHEMA, []).map_err(from_rusqlite)?;
        Ok(Self { conn })
    }
}

/// Configure a connection: WAL journal and a busy timeout for a second
/// process reading while a publish runs.
fn configure(conn: &Connection) -> Result<()> {
    // journal_mode answers with the resulting mode, so it has to be queried
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(from_rusqlite)?;
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(from_rusqlite)?;
    Ok(())
}

impl KvBackend for SqliteKv {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| from_rusqlite(e).with_path(key))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| from_rusqlite(e).with_path(key))
    }

    fn delete_many(&self, keys: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        {
            let mut stmt = tx
                .prepare("DELETE FROM kv WHERE key = ?1")
                .map_err(from_rusqlite)?;
            for key in keys {
                stmt.execute(params![key])
                    .map_err(|e| from_rusqlite(e).with_path(key.as_str()))?;
            }
        }
        tx.commit().map_err(from_rusqlite)?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")
            .map_err(from_rusqlite)?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(keys)
    }
}
