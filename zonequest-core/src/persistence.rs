//! Key-value persistence for lobby state.
//!
//! Every lobby is stored as one JSON document under `lobby_zone_<id>`.  The
//! [`KvStore`] trait abstracts the backend; two are provided:
//!
//! - [`SqliteKvStore`], a single table in a local SQLite file:
//!
//!   ```sql
//!   CREATE TABLE IF NOT EXISTS kv_entries (
//!       key        TEXT PRIMARY KEY,
//!       value      TEXT NOT NULL,
//!       updated_at TEXT NOT NULL
//!   );
//!   ```
//!
//! - [`MemoryKvStore`], a process-local map for tests and throwaway sessions.
//!
//! Writes are full overwrites.  Reads that fail to decode fall back to the
//! default lobby, logging a warning instead of surfacing an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::{PersistenceConfig, StorageBackend};
use crate::error::{Result, ZoneError};
use crate::types::{LobbyState, ZoneId};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A string-keyed, string-valued store.
///
/// Implementations must be `Send + Sync`: the capture timer writes from a
/// spawned task.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the read itself fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the write fails.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.  Returns `true` if an entry was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the delete fails.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Open the backend selected by `config`.
///
/// # Errors
///
/// Returns [`ZoneError::Database`] if the SQLite file cannot be opened.
pub fn open_store(config: &PersistenceConfig) -> Result<Arc<dyn KvStore>> {
    match config.backend {
        StorageBackend::Sqlite => Ok(Arc::new(SqliteKvStore::open(&config.path, config)?)),
        StorageBackend::Memory => Ok(Arc::new(MemoryKvStore::new())),
    }
}

// ---------------------------------------------------------------------------
// Lobby encoding
// ---------------------------------------------------------------------------

/// Serialize `state` and write it under the zone's lobby key.
///
/// # Errors
///
/// Returns [`ZoneError::Serialization`] if JSON encoding fails, or the
/// backend's error if the write fails.
pub fn save_lobby(store: &dyn KvStore, zone: ZoneId, state: &LobbyState) -> Result<()> {
    let start = Instant::now();
    let json = serde_json::to_string(state).map_err(|e| ZoneError::Serialization(e.to_string()))?;
    store.put(&zone.lobby_key(), &json)?;

    debug!(
        zone = %zone,
        npcs = state.npcs.len(),
        bytes = json.len(),
        elapsed_us = start.elapsed().as_micros(),
        "Saved lobby"
    );
    Ok(())
}

/// Load a zone's lobby, or `None` if nothing usable is stored.
///
/// A stored value that fails to parse, or that parses into a lobby failing
/// [`LobbyState::is_consistent`], is treated as absent.
///
/// # Errors
///
/// Only backend read failures are returned.
pub fn load_lobby(store: &dyn KvStore, zone: ZoneId) -> Result<Option<LobbyState>> {
    let Some(raw) = store.get(&zone.lobby_key())? else {
        return Ok(None);
    };

    match serde_json::from_str::<LobbyState>(&raw) {
        Ok(state) if state.is_consistent() => {
            debug!(zone = %zone, npcs = state.npcs.len(), "Loaded lobby");
            Ok(Some(state))
        }
        Ok(_) => {
            warn!(zone = %zone, "Stored lobby violates lobby invariants, using default");
            Ok(None)
        }
        Err(e) => {
            warn!(zone = %zone, error = %e, "Stored lobby is malformed, using default");
            Ok(None)
        }
    }
}

/// Delete a zone's stored lobby.  Returns `true` if one existed.
///
/// # Errors
///
/// Returns the backend's error if the delete fails.
pub fn delete_lobby(store: &dyn KvStore, zone: ZoneId) -> Result<bool> {
    store.remove(&zone.lobby_key())
}

// ---------------------------------------------------------------------------
// SqliteKvStore
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// SQLite-backed [`KvStore`].
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKvStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteKvStore {
    /// Open (or create) a database at `path`.
    ///
    /// The schema is created if missing.  WAL mode is enabled when
    /// `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Lobby store opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT value FROM kv_entries WHERE key = ?1")?;
        let value = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.lock().execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .lock()
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
impl SqliteKvStore {
    /// All stored keys, in ascending order.
    pub(crate) fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT key FROM kv_entries ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// MemoryKvStore
// ---------------------------------------------------------------------------

/// Process-local [`KvStore`].
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}

#[cfg(test)]
impl MemoryKvStore {
    /// All stored keys, in ascending order.
    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
