use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension as _, params};

use crate::foundation::error::{ThenNowError, ThenNowResult};
use crate::store::records::WriteOutcome;

/// File name of the blob database inside the data directory.
pub const BLOB_DB_FILE: &str = "then_and_now.db";

/// Encoded image content for one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    /// MIME type of `bytes`.
    pub mime: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// Durable storage for per-slot binary content.
pub trait BlobBackend {
    /// Insert or replace the blob under `key`.
    fn put(&mut self, key: &str, blob: &StoredBlob) -> ThenNowResult<()>;
    /// Read the blob under `key`.
    fn get(&self, key: &str) -> ThenNowResult<Option<StoredBlob>>;
    /// Delete the blob under `key`; missing keys are not an error.
    fn delete(&mut self, key: &str) -> ThenNowResult<()>;
}

/// SQLite-backed blob table.
pub struct SqliteBlobBackend {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for SqliteBlobBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBlobBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn sql(op: &str, e: rusqlite::Error) -> ThenNowError {
    ThenNowError::storage(format!("blob {op}: {e}"))
}

impl SqliteBlobBackend {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> ThenNowResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ThenNowError::storage(format!("create '{}': {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(|e| sql("open", e))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS blobs (
                slot      TEXT PRIMARY KEY,
                mime      TEXT NOT NULL,
                data      BLOB NOT NULL,
                stored_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| sql("schema", e))?;
        tracing::debug!(path = %path.display(), "blob database opened");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobBackend for SqliteBlobBackend {
    fn put(&mut self, key: &str, blob: &StoredBlob) -> ThenNowResult<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO blobs (slot, mime, data, stored_at) VALUES (?1, ?2, ?3, ?4)",
                params![key, blob.mime, blob.bytes, chrono::Utc::now().timestamp_millis()],
            )
            .map_err(|e| sql("put", e))?;
        Ok(())
    }

    fn get(&self, key: &str) -> ThenNowResult<Option<StoredBlob>> {
        self.conn
            .query_row(
                "SELECT mime, data FROM blobs WHERE slot = ?1",
                params![key],
                |row| {
                    Ok(StoredBlob {
                        mime: row.get(0)?,
                        bytes: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| sql("get", e))
    }

    fn delete(&mut self, key: &str) -> ThenNowResult<()> {
        self.conn
            .execute("DELETE FROM blobs WHERE slot = ?1", params![key])
            .map_err(|e| sql("delete", e))?;
        Ok(())
    }
}

type Opener = Box<dyn FnOnce() -> ThenNowResult<Box<dyn BlobBackend>>>;

enum Backend {
    Unopened(Opener),
    Open(Box<dyn BlobBackend>),
    Unavailable,
}

/// Per-slot binary content store with a session-memory fallback.
///
/// The backend is opened on first use and the outcome is kept for the life of the store. Reads
/// prefer session memory, which only holds content the backend refused.
pub struct BlobStore {
    backend: Backend,
    memory: HashMap<String, StoredBlob>,
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.backend {
            Backend::Unopened(_) => "unopened",
            Backend::Open(_) => "open",
            Backend::Unavailable => "unavailable",
        };
        f.debug_struct("BlobStore")
            .field("backend", &state)
            .field("memory_keys", &self.memory.len())
            .finish()
    }
}

impl BlobStore {
    /// Store backed by a SQLite file at `path`, opened lazily.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::lazy(move || {
            SqliteBlobBackend::open(&path).map(|b| Box::new(b) as Box<dyn BlobBackend>)
        })
    }

    /// Store whose backend is produced by `open` on first use.
    pub fn lazy(open: impl FnOnce() -> ThenNowResult<Box<dyn BlobBackend>> + 'static) -> Self {
        Self {
            backend: Backend::Unopened(Box::new(open)),
            memory: HashMap::new(),
        }
    }

    /// Store over an already-open backend.
    pub fn with_backend(backend: impl BlobBackend + 'static) -> Self {
        Self {
            backend: Backend::Open(Box::new(backend)),
            memory: HashMap::new(),
        }
    }

    /// Session-memory only.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Unavailable,
            memory: HashMap::new(),
        }
    }

    fn backend_mut(&mut self) -> Option<&mut Box<dyn BlobBackend>> {
        if matches!(self.backend, Backend::Unopened(_)) {
            let state = std::mem::replace(&mut self.backend, Backend::Unavailable);
            if let Backend::Unopened(open) = state {
                self.backend = match open() {
                    Ok(b) => Backend::Open(b),
                    Err(e) => {
                        tracing::warn!(error = %e, "blob storage unavailable, using session memory");
                        Backend::Unavailable
                    }
                };
            }
        }
        match &mut self.backend {
            Backend::Open(b) => Some(b),
            _ => None,
        }
    }

    /// Whether a durable backend is open (opening it if needed).
    pub fn is_persistent(&mut self) -> bool {
        self.backend_mut().is_some()
    }

    /// Store `blob` under `key`.
    pub fn save(&mut self, key: &str, blob: StoredBlob) -> WriteOutcome {
        let result = match self.backend_mut() {
            Some(b) => b.put(key, &blob),
            None => {
                self.memory.insert(key.to_string(), blob);
                return WriteOutcome::SessionOnly;
            }
        };
        match result {
            Ok(()) => {
                self.memory.remove(key);
                WriteOutcome::Persisted
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "blob write failed, keeping it in session memory");
                self.memory.insert(key.to_string(), blob);
                WriteOutcome::SessionOnly
            }
        }
    }

    /// Read the blob under `key`.
    ///
    /// `Ok(None)` means confirmed absent. A backend error is returned only when session memory has
    /// nothing for `key` either.
    pub fn load(&mut self, key: &str) -> ThenNowResult<Option<StoredBlob>> {
        if let Some(blob) = self.memory.get(key) {
            return Ok(Some(blob.clone()));
        }
        match self.backend_mut() {
            Some(b) => b.get(key),
            None => Ok(None),
        }
    }

    /// Delete from both tiers. Backend failures are logged.
    pub fn delete(&mut self, key: &str) {
        self.memory.remove(key);
        if let Some(b) = self.backend_mut()
            && let Err(e) = b.delete(key)
        {
            tracing::warn!(key, error = %e, "blob delete failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/blob.rs"]
mod tests;
