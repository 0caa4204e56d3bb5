use std::cell::RefCell;
use std::rc::Rc;

use crate::compose::settings::Settings;
use crate::geometry::viewport::Viewport;
use crate::store::records::{RecordStore, WriteOutcome};

/// Record key for per-slot metadata.
pub const METADATA_KEY: &str = "then-and-now-images";
/// Record key for global settings.
pub const SETTINGS_KEY: &str = "then-and-now-settings";

/// Persisted projection of one slot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotRecord {
    /// Whether a blob is believed to exist for this slot.
    pub has_stored_content: bool,
    /// Horizontal position, 0..=100.
    pub x_pos: f64,
    /// Vertical position, 0..=100.
    pub y_pos: f64,
    /// Zoom, 1..=3.
    pub zoom: f64,
}

impl Default for SlotRecord {
    fn default() -> Self {
        Self::from_viewport(false, &Viewport::default())
    }
}

impl SlotRecord {
    /// Record carrying `viewport`.
    pub fn from_viewport(has_stored_content: bool, viewport: &Viewport) -> Self {
        Self {
            has_stored_content,
            x_pos: viewport.x_pos,
            y_pos: viewport.y_pos,
            zoom: viewport.zoom,
        }
    }

    /// Sanitized viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.x_pos, self.y_pos, self.zoom)
    }
}

/// Both slots' records, always written together.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    /// First slot.
    #[serde(alias = "then")]
    pub before: SlotRecord,
    /// Second slot.
    #[serde(alias = "now")]
    pub after: SlotRecord,
}

/// Small-record store shared by the metadata and settings views.
pub type SharedRecords = Rc<RefCell<RecordStore>>;

fn read_json<T: serde::de::DeserializeOwned + Default>(records: &SharedRecords, key: &str) -> T {
    let Some(raw) = records.borrow().get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored record is unreadable, using defaults");
            T::default()
        }
    }
}

fn write_json<T: serde::Serialize>(records: &SharedRecords, key: &str, value: &T) -> WriteOutcome {
    match serde_json::to_string(value) {
        Ok(json) => records.borrow_mut().set(key, json),
        Err(e) => {
            tracing::warn!(key, error = %e, "record not serializable");
            WriteOutcome::SessionOnly
        }
    }
}

/// Metadata view over the shared record store.
#[derive(Clone, Debug)]
pub struct MetadataStore {
    records: SharedRecords,
}

impl MetadataStore {
    /// View over `records`.
    pub fn new(records: SharedRecords) -> Self {
        Self { records }
    }

    /// Current record, or defaults when absent or unreadable.
    pub fn load(&self) -> MetadataRecord {
        read_json(&self.records, METADATA_KEY)
    }

    /// Replace the whole record.
    pub fn save(&self, record: &MetadataRecord) -> WriteOutcome {
        write_json(&self.records, METADATA_KEY, record)
    }
}

/// Settings view over the shared record store.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    records: SharedRecords,
}

impl SettingsStore {
    /// View over `records`.
    pub fn new(records: SharedRecords) -> Self {
        Self { records }
    }

    /// Current settings, or defaults when absent or unreadable.
    pub fn load(&self) -> Settings {
        read_json(&self.records, SETTINGS_KEY)
    }

    /// Replace the settings record.
    pub fn save(&self, settings: &Settings) -> WriteOutcome {
        write_json(&self.records, SETTINGS_KEY, settings)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/metadata.rs"]
mod tests;
