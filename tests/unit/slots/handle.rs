use super::*;

fn tiny() -> DecodedImage {
    crate::assets::decode::from_rgba(image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255])))
        .unwrap()
}

#[test]
fn drop_releases_exactly_once() {
    let ledger = HandleLedger::shared();
    let h = ledger.issue(tiny());
    assert_eq!(h.id(), 1);
    assert_eq!(ledger.outstanding(), 1);
    drop(h);
    assert_eq!(ledger.issued(), 1);
    assert_eq!(ledger.released(), 1);
    assert_eq!(ledger.outstanding(), 0);
}

#[test]
fn replacement_releases_previous() {
    let ledger = HandleLedger::shared();
    let mut slot = Some(ledger.issue(tiny()));
    let old = slot.replace(ledger.issue(tiny()));
    drop(old);
    assert_eq!(ledger.released(), 1);
    assert_eq!(slot.as_ref().map(ContentHandle::id), Some(2));
    assert_eq!(slot.as_ref().map(|h| h.image().width), Some(2));
}
