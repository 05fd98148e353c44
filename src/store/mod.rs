//! Key-value blob stores backing item persistence.
//!
//! The persistence layer only needs to read and overwrite one text blob by
//! key, so the seam is the small [`BlobStore`] trait. [`SqliteBlobStore`] is
//! the on-disk store used by the binary; [`MemoryBlobStore`] is the in-process
//! fake used by tests, with write counting and failure injection.

mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

/// Errors raised by a blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// An opaque get/set service for text blobs.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, `None` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the blob under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ============================================================
// SQLite store
// ============================================================

#[derive(Clone)]
pub struct SqliteBlobStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBlobStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!("Opened blob store at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_db_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM blobs WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO blobs (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, &now),
        )?;
        Ok(())
    }
}

/// Default database location under the platform data directory.
pub fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "randpick")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("randpick.db"))
}

// ============================================================
// In-memory store
// ============================================================

/// In-process store. Clones share the same contents and counters.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    blobs: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `value` under `key`, not counted as a write.
    pub fn with_blob(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut blobs) = store.inner.blobs.lock() {
            blobs.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Raw blob contents, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner
            .blobs
            .lock()
            .ok()
            .and_then(|blobs| blobs.get(key).cloned())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn blobs(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.inner
            .blobs
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.blobs()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.blobs()?.insert(key.to_string(), value.to_string());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
