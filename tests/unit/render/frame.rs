use super::*;

fn two_px() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 64, 64, 64, 128],
        premultiplied: true,
    }
}

#[test]
fn export_name_uses_millis() {
    assert_eq!(export_file_name(1_700_000_000_123), "then_and_now_1700000000123.png");
    let p = export_path(Path::new("/tmp/out"), 5);
    assert!(p.ends_with("then_and_now_5.png"));
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = two_px();
    assert_eq!(f.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.canvas(), Canvas { width: 2, height: 1 });
}

#[test]
fn png_round_trip_unpremultiplies() {
    let png = two_px().encode_png().unwrap();
    let back = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (2, 1));
    assert_eq!(back.get_pixel(0, 0).0, [255, 0, 0, 255]);
    let px = back.get_pixel(1, 0).0;
    assert_eq!(px[3], 128);
    assert!((i16::from(px[0]) - 128).abs() <= 1);
}

#[test]
fn mismatched_frame_is_a_render_error() {
    let mut f = two_px();
    f.data.pop();
    assert!(matches!(f.encode_png(), Err(ThenNowError::Render(_))));
}

#[test]
fn write_png_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_path(dir.path(), 42);
    two_px().write_png(&path).unwrap();
    assert!(path.exists());
}
