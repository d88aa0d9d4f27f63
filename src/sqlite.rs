// SQLite-backed key-value slot

use crate::models::now_ms;
use crate::storage::{Storage, validate_key};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Slot stored as one row of a `slots` table, like a browser's local storage
pub struct SqliteStorage {
    db: Connection,
    key: String,
}

impl SqliteStorage {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, key: &str) -> Result<Self> {
        validate_key(key)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
        let db = Connection::open(path.as_ref()).context("Failed to open SQLite database")?;

        Self::with_connection(db, key)
    }

    pub fn in_memory(key: &str) -> Result<Self> {
        validate_key(key)?;
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db, key)
    }

    fn with_connection(db: Connection, key: &str) -> Result<Self> {
        let storage = Self {
            db,
            key: key.to_string(),
        };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating slots schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Storage for SqliteStorage {
    fn read(&self) -> Result<Option<String>> {
        self.db
            .query_row("SELECT value FROM slots WHERE key = ?1", [&self.key], |row| row.get(0))
            .optional()
            .context("Failed to read slot from SQLite")
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.db
            .execute(
                "INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![&self.key, contents, now_ms()],
            )
            .context("Failed to write slot to SQLite")?;

        debug!(key = %self.key, bytes = contents.len(), "Wrote slot row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_read_write() {
        let mut storage = SqliteStorage::in_memory("todos").unwrap();
        assert!(storage.read().unwrap().is_none());

        storage.write("[]").unwrap();
        storage.write("null").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("null"));
    }

    #[test]
    fn test_keys_are_independent() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("todostore.db");

        let mut work = SqliteStorage::open(&db_path, "work").unwrap();
        work.write("[1]").unwrap();
        drop(work);

        let home = SqliteStorage::open(&db_path, "home").unwrap();
        assert!(home.read().unwrap().is_none());

        let work = SqliteStorage::open(&db_path, "work").unwrap();
        assert_eq!(work.read().unwrap().as_deref(), Some("[1]"));
        assert_eq!(work.key(), "work");
    }

    #[test]
    fn test_open_rejects_bad_key() {
        let temp = TempDir::new().unwrap();
        assert!(SqliteStorage::open(temp.path().join("x.db"), "bad key").is_err());
    }
}
