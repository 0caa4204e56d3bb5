use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

use super::*;
use crate::assets::decode::from_rgba;
use crate::assets::ingest::ImageMime;
use crate::store::blob::BlobBackend;
use crate::store::metadata::SharedRecords;
use crate::store::records::RecordStore;

#[derive(Clone, Default)]
struct SharedBlobs {
    data: Rc<RefCell<HashMap<String, StoredBlob>>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl BlobBackend for SharedBlobs {
    fn put(&mut self, key: &str, blob: &StoredBlob) -> ThenNowResult<()> {
        if self.fail_writes.get() {
            return Err(ThenNowError::quota_exceeded("blob quota"));
        }
        self.data.borrow_mut().insert(key.into(), blob.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> ThenNowResult<Option<StoredBlob>> {
        if self.fail_reads.get() {
            return Err(ThenNowError::storage("transient"));
        }
        Ok(self.data.borrow().get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> ThenNowResult<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

struct Fixture {
    blobs: SharedBlobs,
    records: SharedRecords,
    ledger: Arc<HandleLedger>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            blobs: SharedBlobs::default(),
            records: Rc::new(RefCell::new(RecordStore::in_memory())),
            ledger: HandleLedger::shared(),
        }
    }

    fn controller(&self) -> SlotController {
        SlotController::new(
            BlobStore::with_backend(self.blobs.clone()),
            MetadataStore::new(Rc::clone(&self.records)),
            Arc::clone(&self.ledger),
        )
    }

    fn stored(&self) -> MetadataRecord {
        MetadataStore::new(Rc::clone(&self.records)).load()
    }
}

fn png_upload(w: u32, h: u32) -> PreparedUpload {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 30, 30, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    PreparedUpload {
        mime: ImageMime::Png,
        bytes,
        image: from_rgba(img).unwrap(),
        optimized: false,
    }
}

#[test]
fn upload_persists_and_a_new_session_hydrates() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    assert_eq!(c.upload(SlotId::Before, png_upload(40, 20), ContentOrigin::User), WriteOutcome::Persisted);
    c.set_position(SlotId::Before, 10.0, 80.0);
    assert!(fx.stored().before.has_stored_content);
    drop(c);

    let mut c = fx.controller();
    assert_eq!(c.phase(SlotId::Before), SlotPhase::Empty);
    assert_eq!(c.hydrate_all(), [HydrateOutcome::Loaded, HydrateOutcome::Skipped]);
    assert_eq!(c.phase(SlotId::Before), SlotPhase::Ready);
    assert_eq!(c.handle(SlotId::Before).map(|h| h.image().width), Some(40));
    assert_eq!(c.viewport(SlotId::Before), Viewport::new(10.0, 80.0, 1.0));
    assert_eq!(c.hydrate(SlotId::Before), HydrateOutcome::Skipped);
}

#[test]
fn missing_blob_self_heals_and_is_not_retried() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::After, png_upload(8, 8), ContentOrigin::User);
    drop(c);
    fx.blobs.data.borrow_mut().clear();

    let mut c = fx.controller();
    assert_eq!(c.hydrate(SlotId::After), HydrateOutcome::Healed);
    assert!(c.is_loaded(SlotId::After));
    assert!(!c.has_stored_content(SlotId::After));
    assert!(!fx.stored().after.has_stored_content);
    assert_eq!(c.hydrate(SlotId::After), HydrateOutcome::Skipped);
}

#[test]
fn corrupt_blob_is_healed_like_a_missing_one() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(8, 8), ContentOrigin::User);
    drop(c);
    fx.blobs.data.borrow_mut().insert(
        "before".into(),
        StoredBlob {
            mime: "image/png".into(),
            bytes: vec![1, 2, 3],
        },
    );

    let mut c = fx.controller();
    assert_eq!(c.hydrate(SlotId::Before), HydrateOutcome::Healed);
    assert!(fx.blobs.data.borrow().is_empty());
    assert_eq!(fx.ledger.outstanding(), 0);
}

#[test]
fn read_error_leaves_slot_retriable() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(8, 8), ContentOrigin::User);
    drop(c);

    let mut c = fx.controller();
    fx.blobs.fail_reads.set(true);
    assert_eq!(c.hydrate(SlotId::Before), HydrateOutcome::Failed);
    assert_eq!(c.phase(SlotId::Before), SlotPhase::Failed { retriable: true });
    assert!(!c.is_loaded(SlotId::Before));
    assert!(fx.stored().before.has_stored_content);

    fx.blobs.fail_reads.set(false);
    assert_eq!(c.hydrate(SlotId::Before), HydrateOutcome::Loaded);
}

#[test]
fn session_only_blob_write_does_not_claim_stored_content() {
    let fx = Fixture::new();
    fx.blobs.fail_writes.set(true);
    let mut c = fx.controller();
    assert_eq!(c.upload(SlotId::After, png_upload(8, 8), ContentOrigin::User), WriteOutcome::SessionOnly);
    assert_eq!(c.phase(SlotId::After), SlotPhase::Ready);
    assert!(!fx.stored().after.has_stored_content);
}

#[test]
fn every_replacement_releases_exactly_one_handle() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(4, 4), ContentOrigin::User);
    c.upload(SlotId::Before, png_upload(4, 4), ContentOrigin::User);
    assert_eq!((fx.ledger.issued(), fx.ledger.released()), (2, 1));
    c.upload(SlotId::After, png_upload(4, 4), ContentOrigin::User);
    c.remove(SlotId::Before);
    assert_eq!((fx.ledger.issued(), fx.ledger.released()), (3, 2));
    c.teardown();
    assert_eq!(fx.ledger.outstanding(), 0);
    assert_eq!(fx.ledger.released(), 3);
}

#[test]
fn remove_resets_metadata_and_clears_loaded_marker() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(8, 8), ContentOrigin::User);
    c.set_zoom(SlotId::Before, 2.5);
    c.remove(SlotId::Before);
    assert_eq!(fx.stored().before, SlotRecord::default());
    assert!(!c.is_loaded(SlotId::Before));
    assert!(fx.blobs.data.borrow().get("before").is_none());

    c.upload(SlotId::Before, png_upload(8, 8), ContentOrigin::User);
    assert_eq!(c.phase(SlotId::Before), SlotPhase::Ready);
    assert_eq!(c.viewport(SlotId::Before), Viewport::default());
}

#[test]
fn samples_never_touch_persisted_user_content() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(30, 10), ContentOrigin::User);
    c.set_position(SlotId::Before, 0.0, 0.0);
    let before = fx.stored();

    c.upload(SlotId::Before, png_upload(5, 5), ContentOrigin::Sample);
    c.zoom_in(SlotId::Before);
    assert_eq!(c.origin(SlotId::Before), ContentOrigin::Sample);
    assert_eq!(fx.stored(), before);
    assert_eq!(fx.blobs.data.borrow().get("before").map(|b| b.bytes.len() > 0), Some(true));

    c.remove(SlotId::Before);
    assert_eq!(fx.stored(), before);
    assert_eq!(c.hydrate(SlotId::Before), HydrateOutcome::Loaded);
    assert_eq!(c.handle(SlotId::Before).map(|h| h.image().width), Some(30));
}

#[test]
fn gesture_ticks_commit_only_on_end() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(200, 100), ContentOrigin::User);
    let frame = Size::new(100.0, 100.0);

    assert!(c.pan(SlotId::Before, Vec2::new(1.0, 0.0)).is_err());
    c.begin_gesture(SlotId::Before, frame).unwrap();
    let live = c.pan(SlotId::Before, Vec2::new(-1000.0, 0.0)).unwrap();
    assert_eq!(live.x_pos, 100.0);
    assert_eq!(c.viewport(SlotId::Before).x_pos, 100.0);
    assert_eq!(c.committed_viewport(SlotId::Before).x_pos, 50.0);
    assert_eq!(fx.stored().before.x_pos, 50.0);

    let committed = c.end_gesture(SlotId::Before).unwrap();
    assert_eq!(committed.x_pos, 100.0);
    assert_eq!(fx.stored().before.x_pos, 100.0);
    assert_eq!(c.end_gesture(SlotId::Before), None);
}

#[test]
fn zoom_gesture_is_clamped_and_reset_recenters() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::After, png_upload(100, 100), ContentOrigin::User);
    c.begin_gesture(SlotId::After, Size::new(100.0, 100.0)).unwrap();
    let vp = c.zoom_at(SlotId::After, 10.0, Point::new(0.0, 0.0)).unwrap();
    assert!((vp.zoom - 3.0).abs() < 1e-9);
    assert_eq!((vp.x_pos, vp.y_pos), (0.0, 0.0));
    c.end_gesture(SlotId::After);

    assert_eq!(c.reset(SlotId::After), Viewport::default());
    assert_eq!(fx.stored().after.viewport(), Viewport::default());
}

#[test]
fn discrete_zoom_steps_clamp() {
    let fx = Fixture::new();
    let mut c = fx.controller();
    c.upload(SlotId::Before, png_upload(8, 8), ContentOrigin::User);
    assert!((c.zoom_in(SlotId::Before).zoom - 1.1).abs() < 1e-9);
    assert_eq!(c.zoom_out(SlotId::Before).zoom, 1.0);
    assert_eq!(c.zoom_out(SlotId::Before).zoom, 1.0);
    assert_eq!(c.set_zoom(SlotId::Before, 7.0).zoom, 3.0);
    assert_eq!(fx.stored().before.zoom, 3.0);
}
