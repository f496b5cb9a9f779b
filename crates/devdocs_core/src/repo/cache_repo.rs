//! Key/value cache repository.
//!
//! # Responsibility
//! - Provide get/put/remove over the `cache_entries` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `put_entry` is last-write-wins per key.
//! - Removing a missing key is not an error.

use crate::db::{DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Storage contract behind the snapshot cache.
pub trait CacheRepository {
    fn get_entry(&self, key: &str) -> DbResult<Option<String>>;
    fn put_entry(&self, key: &str, value: &str) -> DbResult<()>;
    fn remove_entry(&self, key: &str) -> DbResult<()>;
}

/// SQLite-backed cache repository owning its connection.
pub struct SqliteCacheRepository {
    conn: Connection,
}

impl SqliteCacheRepository {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl CacheRepository for SqliteCacheRepository {
    fn get_entry(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(value)
    }

    fn put_entry(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO cache_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_entry(&self, key: &str) -> DbResult<()> {
        self.conn
            .execute("DELETE FROM cache_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
