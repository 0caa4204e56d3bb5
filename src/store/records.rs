use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ThenNowError, ThenNowResult};

/// Default byte quota for small records, matching the common browser limit.
pub const DEFAULT_RECORD_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

const PROBE_KEY: &str = "__then_and_now_probe__";
const USAGE_WARN_RATIO: f64 = 0.8;

/// Outcome of a write that cannot fail from the caller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Stored durably.
    Persisted,
    /// Kept in session memory only.
    SessionOnly,
}

impl WriteOutcome {
    /// `true` for [`WriteOutcome::Persisted`].
    pub fn is_persisted(self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// Durable key/value storage for small string records.
pub trait RecordBackend {
    /// Read a record.
    fn get(&self, key: &str) -> ThenNowResult<Option<String>>;
    /// Write a record, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> ThenNowResult<()>;
    /// Delete a record; missing keys are not an error.
    fn remove(&mut self, key: &str) -> ThenNowResult<()>;
}

/// One JSON file per key under a directory, with a total byte quota.
#[derive(Clone, Debug)]
pub struct FileRecordBackend {
    dir: PathBuf,
    quota_bytes: u64,
}

impl FileRecordBackend {
    /// Backend rooted at `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes,
        }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ThenNowResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ThenNowError::validation(format!(
                "record key '{key}' must be non-empty [A-Za-z0-9_-]"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Bytes used by every record except `skip`.
    fn usage_excluding(&self, skip: &Path) -> ThenNowResult<u64> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(ThenNowError::storage(format!(
                    "list '{}': {e}",
                    self.dir.display()
                )));
            }
        };
        let mut total = 0u64;
        for entry in entries {
            let entry = entry.context("read record dir entry")?;
            let path = entry.path();
            if path == skip || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
        Ok(total)
    }
}

impl RecordBackend for FileRecordBackend {
    fn get(&self, key: &str) -> ThenNowResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ThenNowError::storage(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> ThenNowResult<()> {
        let path = self.path_for(key)?;
        let used = self.usage_excluding(&path)?;
        let after = used + value.len() as u64;
        if after > self.quota_bytes {
            return Err(ThenNowError::quota_exceeded(format!(
                "writing '{key}' needs {after} bytes, quota is {}",
                self.quota_bytes
            )));
        }
        if after as f64 > self.quota_bytes as f64 * USAGE_WARN_RATIO {
            tracing::warn!(used = after, quota = self.quota_bytes, "record storage nearly full");
        }

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ThenNowError::storage(format!("create '{}': {e}", self.dir.display())))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| ThenNowError::storage(format!("write '{}': {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| ThenNowError::storage(format!("commit '{}': {e}", path.display())))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ThenNowResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ThenNowError::storage(format!(
                "remove '{}': {e}",
                path.display()
            ))),
        }
    }
}

/// Small-record store with a silent in-memory fallback.
///
/// Backend availability is probed once at construction. Writes that the backend refuses land in a
/// session-memory map that shadows the backend for that key until a later write succeeds.
pub struct RecordStore {
    backend: Option<Box<dyn RecordBackend>>,
    shadow: HashMap<String, String>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("persistent", &self.backend.is_some())
            .field("shadowed_keys", &self.shadow.len())
            .finish()
    }
}

impl RecordStore {
    /// Probe `backend` and use it if it accepts a write/remove round trip.
    pub fn open(backend: impl RecordBackend + 'static) -> Self {
        let mut backend: Box<dyn RecordBackend> = Box::new(backend);
        let probe = backend
            .set(PROBE_KEY, "1")
            .and_then(|()| backend.remove(PROBE_KEY));
        let backend = match probe {
            Ok(()) => Some(backend),
            Err(e) => {
                tracing::warn!(error = %e, "record storage unavailable, using session memory");
                None
            }
        };
        Self {
            backend,
            shadow: HashMap::new(),
        }
    }

    /// Session-memory only.
    pub fn in_memory() -> Self {
        Self {
            backend: None,
            shadow: HashMap::new(),
        }
    }

    /// Whether a durable backend passed the probe.
    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    /// Current value for `key`; backend read errors read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(v) = self.shadow.get(key) {
            return Some(v.clone());
        }
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "record read failed");
                None
            }
        }
    }

    /// Write `value`, falling back to session memory on any backend failure.
    pub fn set(&mut self, key: &str, value: String) -> WriteOutcome {
        let Some(backend) = self.backend.as_mut() else {
            self.shadow.insert(key.to_string(), value);
            return WriteOutcome::SessionOnly;
        };
        match backend.set(key, &value) {
            Ok(()) => {
                self.shadow.remove(key);
                WriteOutcome::Persisted
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "record write failed, keeping it in session memory");
                self.shadow.insert(key.to_string(), value);
                WriteOutcome::SessionOnly
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/records.rs"]
mod tests;
