//! Workspace configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::ingest::DeviceClass;
use crate::compose::layout::DEFAULT_PREVIEW_MAX_WIDTH;
use crate::foundation::error::{ThenNowError, ThenNowResult};
use crate::store::records::DEFAULT_RECORD_QUOTA_BYTES;

/// Environment variable naming the host device class (`mobile` or `desktop`).
pub const DEVICE_ENV: &str = "THEN_AND_NOW_DEVICE";

const APP_DIR: &str = "then-and-now";

/// Options for opening a [`crate::Workspace`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceOpts {
    /// Directory holding the record files and blob database. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Selects upload limits.
    pub device_class: DeviceClass,
    /// Label font; the built-in bitmap face is used when unset.
    pub font_path: Option<PathBuf>,
    /// Preview canvases wider than this are scaled down.
    pub preview_max_width: u32,
    /// Byte quota for the small-record store.
    pub record_quota_bytes: u64,
}

impl Default for WorkspaceOpts {
    fn default() -> Self {
        Self {
            data_dir: None,
            device_class: DeviceClass::default(),
            font_path: None,
            preview_max_width: DEFAULT_PREVIEW_MAX_WIDTH,
            record_quota_bytes: DEFAULT_RECORD_QUOTA_BYTES,
        }
    }
}

impl WorkspaceOpts {
    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_path(path: &Path) -> ThenNowResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&raw)
            .map_err(|e| ThenNowError::serde(format!("config '{}': {e}", path.display())))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject values the workspace cannot run with.
    pub fn validate(&self) -> ThenNowResult<()> {
        if self.preview_max_width == 0 {
            return Err(ThenNowError::validation("preview_max_width must be > 0"));
        }
        if self.record_quota_bytes == 0 {
            return Err(ThenNowError::validation("record_quota_bytes must be > 0"));
        }
        Ok(())
    }

    /// Apply [`DEVICE_ENV`] if it is set to a known class.
    pub fn with_device_from_env(mut self) -> Self {
        let Ok(raw) = std::env::var(DEVICE_ENV) else {
            return self;
        };
        match raw.parse() {
            Ok(class) => self.device_class = class,
            Err(e) => tracing::warn!(error = %e, "ignoring {DEVICE_ENV}"),
        }
        self
    }
}

/// Platform data directory for the application, e.g. `~/.local/share/then-and-now` on Linux.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join(APP_DIR))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
