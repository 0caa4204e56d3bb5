use std::sync::Arc;

use crate::assets::decode::decode_image;
use crate::assets::ingest::PreparedUpload;
use crate::foundation::core::{Point, Size, Vec2};
use crate::foundation::error::{ThenNowError, ThenNowResult};
use crate::geometry::gesture::PanZoomGesture;
use crate::geometry::viewport::Viewport;
use crate::slots::handle::{ContentHandle, HandleLedger};
use crate::slots::slot::SlotId;
use crate::store::blob::{BlobStore, StoredBlob};
use crate::store::metadata::{MetadataRecord, MetadataStore, SlotRecord};
use crate::store::records::WriteOutcome;

/// Lifecycle of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPhase {
    /// No content.
    Empty,
    /// Hydration in progress.
    Loading,
    /// Content handle available.
    Ready,
    /// Hydration failed.
    Failed {
        /// Whether another hydration attempt may succeed.
        retriable: bool,
    },
}

/// Where a slot's current content came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentOrigin {
    /// Uploaded by the user; persisted.
    #[default]
    User,
    /// Demo content; session-only.
    Sample,
}

/// Result of one hydration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Already loaded, or nothing stored.
    Skipped,
    /// Content restored.
    Loaded,
    /// Stored content was missing or unreadable; metadata was healed.
    Healed,
    /// Backend read error; the next attempt retries.
    Failed,
}

#[derive(Debug)]
struct SlotState {
    record: SlotRecord,
    committed: Viewport,
    live: Viewport,
    handle: Option<ContentHandle>,
    loaded: bool,
    origin: ContentOrigin,
    phase: SlotPhase,
    gesture: Option<PanZoomGesture>,
}

impl SlotState {
    fn from_record(record: SlotRecord) -> Self {
        let viewport = record.viewport();
        Self {
            record: SlotRecord::from_viewport(record.has_stored_content, &viewport),
            committed: viewport,
            live: viewport,
            handle: None,
            loaded: false,
            origin: ContentOrigin::User,
            phase: SlotPhase::Empty,
            gesture: None,
        }
    }
}

/// Facade over the blob store, metadata store and per-slot session state.
///
/// Gesture ticks only touch the live viewport. Every discrete action commits the viewport once and
/// writes the whole metadata record.
#[derive(Debug)]
pub struct SlotController {
    blobs: BlobStore,
    metadata: MetadataStore,
    ledger: Arc<HandleLedger>,
    slots: [SlotState; 2],
}

impl SlotController {
    /// Controller seeded from whatever `metadata` currently holds.
    pub fn new(blobs: BlobStore, metadata: MetadataStore, ledger: Arc<HandleLedger>) -> Self {
        let stored = metadata.load();
        Self {
            blobs,
            metadata,
            ledger,
            slots: [
                SlotState::from_record(stored.before),
                SlotState::from_record(stored.after),
            ],
        }
    }

    fn state(&self, slot: SlotId) -> &SlotState {
        &self.slots[slot.index()]
    }

    fn state_mut(&mut self, slot: SlotId) -> &mut SlotState {
        &mut self.slots[slot.index()]
    }

    /// Shared handle ledger.
    pub fn ledger(&self) -> &Arc<HandleLedger> {
        &self.ledger
    }

    /// Lifecycle phase.
    pub fn phase(&self, slot: SlotId) -> SlotPhase {
        self.state(slot).phase
    }

    /// Live viewport, including uncommitted gesture movement.
    pub fn viewport(&self, slot: SlotId) -> Viewport {
        self.state(slot).live
    }

    /// Last committed viewport.
    pub fn committed_viewport(&self, slot: SlotId) -> Viewport {
        self.state(slot).committed
    }

    /// Whether metadata claims durable content for `slot`.
    pub fn has_stored_content(&self, slot: SlotId) -> bool {
        self.state(slot).record.has_stored_content
    }

    /// Current content handle.
    pub fn handle(&self, slot: SlotId) -> Option<&ContentHandle> {
        self.state(slot).handle.as_ref()
    }

    /// Origin of the current content.
    pub fn origin(&self, slot: SlotId) -> ContentOrigin {
        self.state(slot).origin
    }

    /// Whether hydration has finished for `slot`.
    pub fn is_loaded(&self, slot: SlotId) -> bool {
        self.state(slot).loaded
    }

    fn write_metadata(&self) -> WriteOutcome {
        self.metadata.save(&MetadataRecord {
            before: self.slots[0].record,
            after: self.slots[1].record,
        })
    }

    fn commit(&mut self, slot: SlotId, viewport: Viewport) -> Viewport {
        let state = self.state_mut(slot);
        state.committed = viewport;
        state.live = viewport;
        if state.origin == ContentOrigin::Sample {
            return viewport;
        }
        state.record = SlotRecord::from_viewport(state.record.has_stored_content, &viewport);
        self.write_metadata();
        tracing::debug!(%slot, x = viewport.x_pos, y = viewport.y_pos, zoom = viewport.zoom, "viewport committed");
        viewport
    }

    fn install(&mut self, slot: SlotId, handle: ContentHandle) {
        let state = self.state_mut(slot);
        let old = state.handle.replace(handle);
        drop(old);
        state.gesture = None;
        state.loaded = true;
        state.phase = SlotPhase::Ready;
    }

    /// Place prepared content in `slot`.
    ///
    /// User content is written to the blob store; `hasStoredContent` is set only when that write
    /// was durable. Sample content writes nothing. Either way the viewport resets to centered.
    pub fn upload(
        &mut self,
        slot: SlotId,
        prepared: PreparedUpload,
        origin: ContentOrigin,
    ) -> WriteOutcome {
        let PreparedUpload {
            mime, bytes, image, ..
        } = prepared;
        let handle = self.ledger.issue(image);
        let viewport = Viewport::default();

        let outcome = match origin {
            ContentOrigin::User => self.blobs.save(
                slot.as_str(),
                StoredBlob {
                    mime: mime.as_str().to_string(),
                    bytes,
                },
            ),
            ContentOrigin::Sample => WriteOutcome::SessionOnly,
        };

        self.install(slot, handle);
        let state = self.state_mut(slot);
        state.origin = origin;
        state.committed = viewport;
        state.live = viewport;
        if origin == ContentOrigin::User {
            state.record = SlotRecord::from_viewport(outcome.is_persisted(), &viewport);
            self.write_metadata();
        }
        tracing::debug!(%slot, ?origin, persisted = outcome.is_persisted(), "slot content replaced");
        outcome
    }

    fn heal(&mut self, slot: SlotId) {
        self.blobs.delete(slot.as_str());
        let state = self.state_mut(slot);
        state.record.has_stored_content = false;
        state.loaded = true;
        state.phase = SlotPhase::Empty;
        self.write_metadata();
    }

    /// Restore stored content for `slot`.
    ///
    /// Re-entrant calls for a loaded slot are no-ops. Missing or undecodable content heals the
    /// metadata and is terminal; a backend read error leaves the slot retriable.
    #[tracing::instrument(skip(self))]
    pub fn hydrate(&mut self, slot: SlotId) -> HydrateOutcome {
        let state = self.state(slot);
        if state.loaded || state.handle.is_some() || !state.record.has_stored_content {
            return HydrateOutcome::Skipped;
        }
        self.state_mut(slot).phase = SlotPhase::Loading;

        match self.blobs.load(slot.as_str()) {
            Ok(Some(blob)) => match decode_image(&blob.bytes) {
                Ok(image) => {
                    let handle = self.ledger.issue(image);
                    self.install(slot, handle);
                    self.state_mut(slot).origin = ContentOrigin::User;
                    HydrateOutcome::Loaded
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored content is unreadable, clearing it");
                    self.heal(slot);
                    HydrateOutcome::Healed
                }
            },
            Ok(None) => {
                tracing::warn!("metadata claims content that is not stored, clearing the flag");
                self.heal(slot);
                HydrateOutcome::Healed
            }
            Err(e) => {
                tracing::warn!(error = %e, "content read failed, will retry");
                self.state_mut(slot).phase = SlotPhase::Failed { retriable: true };
                HydrateOutcome::Failed
            }
        }
    }

    /// Hydrate both slots.
    pub fn hydrate_all(&mut self) -> [HydrateOutcome; 2] {
        let outcomes = SlotId::ALL.map(|slot| self.hydrate(slot));
        tracing::info!(before = ?outcomes[0], after = ?outcomes[1], "hydration finished");
        outcomes
    }

    /// Clear `slot`.
    ///
    /// User content loses its blob and metadata. Removing sample content leaves persisted records
    /// alone, so stored user content can hydrate again.
    pub fn remove(&mut self, slot: SlotId) {
        let origin = self.state(slot).origin;
        if origin == ContentOrigin::User {
            self.blobs.delete(slot.as_str());
        }
        let state = self.state_mut(slot);
        let old = state.handle.take();
        drop(old);
        state.gesture = None;
        state.loaded = false;
        state.phase = SlotPhase::Empty;
        state.origin = ContentOrigin::User;
        match origin {
            ContentOrigin::User => {
                state.record = SlotRecord::default();
                state.committed = Viewport::default();
                state.live = Viewport::default();
                self.write_metadata();
            }
            ContentOrigin::Sample => {
                let restored = state.record.viewport();
                state.committed = restored;
                state.live = restored;
            }
        }
        tracing::debug!(%slot, ?origin, "slot cleared");
    }

    /// Release every handle and drop gesture state.
    pub fn teardown(&mut self) {
        for state in &mut self.slots {
            state.gesture = None;
            if let Some(handle) = state.handle.take() {
                drop(handle);
                state.loaded = false;
                state.phase = SlotPhase::Empty;
            }
        }
        tracing::debug!(outstanding = self.ledger.outstanding(), "slots torn down");
    }

    /// Start a continuous gesture in a frame of `frame` size.
    pub fn begin_gesture(&mut self, slot: SlotId, frame: Size) -> ThenNowResult<()> {
        let state = self.state_mut(slot);
        let image = state
            .handle
            .as_ref()
            .map(|h| h.image().size())
            .ok_or_else(|| ThenNowError::validation(format!("slot '{slot}' has no content")))?;
        let mut gesture = PanZoomGesture::new(image, frame, &state.committed);
        gesture.begin();
        state.gesture = Some(gesture);
        Ok(())
    }

    fn gesture_mut(&mut self, slot: SlotId) -> ThenNowResult<&mut PanZoomGesture> {
        self.state_mut(slot)
            .gesture
            .as_mut()
            .ok_or_else(|| ThenNowError::validation(format!("no gesture in progress for '{slot}'")))
    }

    /// Pan tick; updates the live viewport only.
    pub fn pan(&mut self, slot: SlotId, delta: Vec2) -> ThenNowResult<Viewport> {
        let viewport = self.gesture_mut(slot)?.pan_by(delta);
        self.state_mut(slot).live = viewport;
        Ok(viewport)
    }

    /// Zoom tick anchored at a frame-space point; updates the live viewport only.
    pub fn zoom_at(&mut self, slot: SlotId, factor: f64, anchor: Point) -> ThenNowResult<Viewport> {
        let viewport = self.gesture_mut(slot)?.zoom_by(factor, anchor);
        self.state_mut(slot).live = viewport;
        Ok(viewport)
    }

    /// Finish the gesture and commit its viewport.
    pub fn end_gesture(&mut self, slot: SlotId) -> Option<Viewport> {
        let viewport = self.state_mut(slot).gesture.take()?.end()?;
        Some(self.commit(slot, viewport))
    }

    /// Set zoom, keeping position.
    pub fn set_zoom(&mut self, slot: SlotId, zoom: f64) -> Viewport {
        let viewport = self.state(slot).committed.with_zoom(zoom);
        self.apply(slot, viewport)
    }

    /// Step zoom up.
    pub fn zoom_in(&mut self, slot: SlotId) -> Viewport {
        let viewport = self.state(slot).committed.zoomed_in();
        self.apply(slot, viewport)
    }

    /// Step zoom down.
    pub fn zoom_out(&mut self, slot: SlotId) -> Viewport {
        let viewport = self.state(slot).committed.zoomed_out();
        self.apply(slot, viewport)
    }

    /// Set position, keeping zoom.
    pub fn set_position(&mut self, slot: SlotId, x_pos: f64, y_pos: f64) -> Viewport {
        let viewport = self.state(slot).committed.with_position(x_pos, y_pos);
        self.apply(slot, viewport)
    }

    /// Back to centered, unzoomed.
    pub fn reset(&mut self, slot: SlotId) -> Viewport {
        self.apply(slot, Viewport::default())
    }

    fn apply(&mut self, slot: SlotId, viewport: Viewport) -> Viewport {
        self.state_mut(slot).gesture = None;
        self.commit(slot, viewport)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slots/controller.rs"]
mod tests;
