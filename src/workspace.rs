use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;

use crate::assets::ingest::{IngestPipeline, Upload};
use crate::compose::layout::RenderMode;
use crate::compose::settings::Settings;
use crate::config::WorkspaceOpts;
use crate::foundation::error::{ThenNowError, ThenNowResult};
use crate::geometry::viewport::Viewport;
use crate::render::composite::{CompositeInput, CompositeRenderer, SourceView};
use crate::render::frame::{FrameRGBA, export_path};
use crate::render::text::LabelPainter;
use crate::slots::controller::{ContentOrigin, HydrateOutcome, SlotController, SlotPhase};
use crate::slots::handle::HandleLedger;
use crate::slots::slot::SlotId;
use crate::store::blob::{BLOB_DB_FILE, BlobStore};
use crate::store::metadata::{MetadataStore, SettingsStore};
use crate::store::records::{FileRecordBackend, RecordStore, WriteOutcome};

const RECORDS_DIR: &str = "records";

/// Snapshot of one slot for display.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotStatus {
    /// Which slot.
    pub slot: SlotId,
    /// Lifecycle phase.
    pub phase: SlotPhase,
    /// Committed viewport.
    pub viewport: Viewport,
    /// Whether metadata claims durable content.
    pub has_stored_content: bool,
    /// Origin of loaded content.
    pub origin: ContentOrigin,
    /// Pixel size of loaded content.
    pub size: Option<(u32, u32)>,
}

/// One editing session: two slots, settings, and the renderer.
///
/// Opening a workspace hydrates stored content. Previews that fail to render leave the previous
/// preview in place.
pub struct Workspace {
    opts: WorkspaceOpts,
    ingest: IngestPipeline,
    slots: SlotController,
    settings_store: SettingsStore,
    settings: Settings,
    renderer: CompositeRenderer,
    last_preview: Option<FrameRGBA>,
    records_persistent: bool,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("opts", &self.opts)
            .field("slots", &self.slots)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Open a workspace and hydrate whatever was stored.
    pub fn open(opts: WorkspaceOpts) -> ThenNowResult<Self> {
        opts.validate()?;

        let (records, blobs) = match &opts.data_dir {
            Some(dir) => (
                RecordStore::open(FileRecordBackend::new(
                    dir.join(RECORDS_DIR),
                    opts.record_quota_bytes,
                )),
                BlobStore::sqlite(dir.join(BLOB_DB_FILE)),
            ),
            None => (RecordStore::in_memory(), BlobStore::in_memory()),
        };
        let records_persistent = records.is_persistent();
        let records = Rc::new(RefCell::new(records));

        let labels = match &opts.font_path {
            Some(path) => LabelPainter::from_font_path(path)?,
            None => LabelPainter::bitmap(),
        };

        let settings_store = SettingsStore::new(Rc::clone(&records));
        let settings = settings_store.load();
        let mut slots = SlotController::new(
            blobs,
            MetadataStore::new(records),
            HandleLedger::shared(),
        );
        slots.hydrate_all();

        tracing::info!(
            data_dir = ?opts.data_dir,
            device = ?opts.device_class,
            records_persistent,
            vector_labels = labels.has_vector_font(),
            "workspace opened"
        );

        Ok(Self {
            ingest: IngestPipeline::new(opts.device_class),
            opts,
            slots,
            settings_store,
            settings,
            renderer: CompositeRenderer::new(labels),
            last_preview: None,
            records_persistent,
        })
    }

    /// Fully in-memory workspace with default options.
    pub fn in_memory() -> ThenNowResult<Self> {
        Self::open(WorkspaceOpts::default())
    }

    /// Options the workspace was opened with.
    pub fn opts(&self) -> &WorkspaceOpts {
        &self.opts
    }

    /// Replace the ingest pipeline (custom validator or HEIF converter).
    pub fn with_ingest(mut self, ingest: IngestPipeline) -> Self {
        self.ingest = ingest;
        self
    }

    /// Slot state, read-only.
    pub fn slots(&self) -> &SlotController {
        &self.slots
    }

    /// Slot state, for gestures and discrete viewport actions.
    pub fn slots_mut(&mut self) -> &mut SlotController {
        &mut self.slots
    }

    /// Whether small records are written durably.
    pub fn records_persistent(&self) -> bool {
        self.records_persistent
    }

    /// Retry hydration for slots that are not loaded yet.
    pub fn hydrate(&mut self) -> [HydrateOutcome; 2] {
        self.slots.hydrate_all()
    }

    /// Validate, decode and store an upload in `slot`.
    ///
    /// Errors leave the slot untouched.
    pub fn upload(&mut self, slot: SlotId, upload: Upload) -> ThenNowResult<WriteOutcome> {
        let prepared = self.ingest.prepare(upload)?;
        Ok(self.slots.upload(slot, prepared, ContentOrigin::User))
    }

    /// Load demo content into both slots without persisting it.
    pub fn load_samples(&mut self, before: Upload, after: Upload) -> ThenNowResult<()> {
        let before = self.ingest.prepare(before)?;
        let after = self.ingest.prepare(after)?;
        self.slots.upload(SlotId::Before, before, ContentOrigin::Sample);
        self.slots.upload(SlotId::After, after, ContentOrigin::Sample);
        Ok(())
    }

    /// Clear `slot`.
    pub fn remove(&mut self, slot: SlotId) {
        self.slots.remove(slot);
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist settings.
    pub fn update_settings(&mut self, settings: Settings) -> WriteOutcome {
        let outcome = self.settings_store.save(&settings);
        self.settings = settings;
        outcome
    }

    /// Per-slot status.
    pub fn status(&self) -> [SlotStatus; 2] {
        SlotId::ALL.map(|slot| SlotStatus {
            slot,
            phase: self.slots.phase(slot),
            viewport: self.slots.committed_viewport(slot),
            has_stored_content: self.slots.has_stored_content(slot),
            origin: self.slots.origin(slot),
            size: self
                .slots
                .handle(slot)
                .map(|h| (h.image().width, h.image().height)),
        })
    }

    fn render(&mut self, mode: RenderMode) -> ThenNowResult<FrameRGBA> {
        let (Some(first), Some(second)) = (
            self.slots.handle(SlotId::Before),
            self.slots.handle(SlotId::After),
        ) else {
            return Err(ThenNowError::validation("Both images must be uploaded"));
        };
        let input = CompositeInput {
            first: SourceView {
                image: first.image(),
                viewport: self.slots.viewport(SlotId::Before),
            },
            second: SourceView {
                image: second.image(),
                viewport: self.slots.viewport(SlotId::After),
            },
            settings: &self.settings,
        };
        self.renderer.render(&input, mode)
    }

    /// Render a size-capped preview from live viewports.
    ///
    /// On error the previous preview is kept and still available from [`Workspace::last_preview`].
    pub fn render_preview(&mut self) -> ThenNowResult<&FrameRGBA> {
        let mode = RenderMode::Preview {
            max_width: self.opts.preview_max_width,
        };
        match self.render(mode) {
            Ok(frame) => Ok(self.last_preview.insert(frame)),
            Err(e) => {
                tracing::warn!(error = %e, "preview render failed, keeping previous preview");
                Err(e)
            }
        }
    }

    /// Most recent successful preview.
    pub fn last_preview(&self) -> Option<&FrameRGBA> {
        self.last_preview.as_ref()
    }

    /// Render at full resolution.
    pub fn render_export(&mut self) -> ThenNowResult<FrameRGBA> {
        self.render(RenderMode::Export)
    }

    /// Render at full resolution and write `then_and_now_<ms>.png` into `dir`.
    pub fn export_png(&mut self, dir: &Path) -> ThenNowResult<PathBuf> {
        let frame = self.render_export()?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export dir '{}'", dir.display()))?;
        let path = export_path(dir, chrono::Utc::now().timestamp_millis());
        frame.write_png(&path)?;
        tracing::info!(path = %path.display(), w = frame.width, h = frame.height, "exported");
        Ok(path)
    }

    /// Release every content handle.
    pub fn close(mut self) {
        self.slots.teardown();
    }
}

#[cfg(test)]
#[path = "../tests/unit/workspace.rs"]
mod tests;
