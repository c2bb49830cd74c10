// Durable key-value slot
// The ledger is persisted as one serialized value under a fixed key.
// Backends: SQLite (default), one JSON file per key, or an in-process map.

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A place to keep whole serialized values by key.
/// Writes overwrite; there are no partial updates.
pub trait KeyValueSlot {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueSlot + ?Sized> KeyValueSlot for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

// ============================================================================
// SQLITE
// ============================================================================

pub struct SqliteSlot {
    conn: Connection,
}

impl SqliteSlot {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    /// When the value under `key` was last written
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let stamp: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(stamp
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; in-memory databases report "memory" instead
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueSlot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

// ============================================================================
// JSON FILES
// ============================================================================

/// One `<key>.json` file per key inside `dir`
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key))
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write beside the target then rename over it, so a crash mid-write
    /// never leaves a truncated `<key>.json`
    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.temp_path_for(key);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    entries: HashMap<String, String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut slot = Self::new();
        slot.entries.insert(key.to_string(), value.to_string());
        slot
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let unique = format!("finance-tracker-{}-{}", name, uuid::Uuid::new_v4());
        std::env::temp_dir().join(unique)
    }

    #[test]
    fn test_sqlite_read_missing_key() {
        let slot = SqliteSlot::open_in_memory().unwrap();
        assert_eq!(slot.read("nothing").unwrap(), None);
        assert_eq!(slot.updated_at("nothing").unwrap(), None);
    }

    #[test]
    fn test_sqlite_write_overwrites() {
        let mut slot = SqliteSlot::open_in_memory().unwrap();

        slot.write("k", "first").unwrap();
        slot.write("k", "second").unwrap();

        assert_eq!(slot.read("k").unwrap().as_deref(), Some("second"));
        assert!(slot.updated_at("k").unwrap().is_some());

        let rows: i64 = slot
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_persists_across_connections() {
        let dir = temp_dir("sqlite");
        let path = dir.join("ledger.db");

        {
            let mut slot = SqliteSlot::open(&path).unwrap();
            slot.write("k", "kept").unwrap();
        }

        let slot = SqliteSlot::open(&path).unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("kept"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_slot_roundtrip() {
        let dir = temp_dir("file");
        let mut slot = FileSlot::new(dir.clone());

        assert_eq!(slot.read("k").unwrap(), None);
        slot.write("k", "{\"a\":1}").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(slot.path_for("k").ends_with("k.json"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_slot_leaves_no_partial_target() {
        let dir = temp_dir("file-atomic");
        let mut slot = FileSlot::new(dir.clone());
        let full = r#"{"incomes":[],"expenses":[]}"#;
        slot.write("k", full).unwrap();

        // Interrupted write: only the temp file holds the truncated payload
        let partial = &full[..full.len() / 2];
        fs::write(slot.temp_path_for("k"), partial).unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some(full));

        // Next write replaces the stale temp file and leaves none behind
        let next = r#"{"incomes":[{"id":"a","description":"d","value":1,"category":"Salary"}],"expenses":[]}"#;
        slot.write("k", next).unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some(next));
        assert!(!slot.temp_path_for("k").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_slot() {
        let mut slot = MemorySlot::with_entry("a", "1");
        assert_eq!(slot.read("a").unwrap().as_deref(), Some("1"));
        slot.write("a", "2").unwrap();
        assert_eq!(slot.read("a").unwrap().as_deref(), Some("2"));
        assert_eq!(slot.read("b").unwrap(), None);
    }

    #[test]
    fn test_boxed_slot_delegates() {
        let mut slot: Box<dyn KeyValueSlot> = Box::new(MemorySlot::new());
        slot.write("k", "v").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("v"));
    }
}
