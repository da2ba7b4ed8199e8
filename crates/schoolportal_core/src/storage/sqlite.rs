//! Durable storage area backed by the `kv_entries` table.

use super::{KeyValueStorage, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Area name used for origin-scoped durable entries.
pub const LOCAL_AREA: &str = "local";

/// SQLite-backed key-value area.
///
/// Several areas can share one connection; entries are partitioned by `area`.
#[derive(Debug, Clone, Copy)]
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
    area: &'static str,
}

impl<'conn> SqliteStorage<'conn> {
    /// Creates the durable `local` area over a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_area(conn, LOCAL_AREA)
    }

    pub fn with_area(conn: &'conn Connection, area: &'static str) -> Self {
        Self { conn, area }
    }

    pub fn area(&self) -> &'static str {
        self.area
    }

    /// Lists keys in this area in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries WHERE area = ?1 ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([self.area], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStorage for SqliteStorage<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE area = ?1 AND key = ?2;",
                params![self.area, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (area, key, value, updated_at)
             VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
             ON CONFLICT(area, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.area, key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM kv_entries WHERE area = ?1 AND key = ?2;",
            params![self.area, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE area = ?1;", [self.area])?;
        Ok(())
    }
}
