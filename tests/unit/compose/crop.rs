use super::*;

#[test]
fn wider_target_crops_height() {
    // 2000x1000 image into a 3:1 region: full width, height 2000/3.
    let c = source_crop(2000, 1000, &Viewport::default(), 300.0, 100.0);
    assert_eq!(c.s_width, 2000);
    assert_eq!(c.s_height, 667);
    assert_eq!(c.sx, 0);
    assert_eq!(c.sy, 167);
}

#[test]
fn narrower_target_crops_width() {
    let c = source_crop(2000, 1000, &Viewport::default(), 100.0, 100.0);
    assert_eq!((c.s_width, c.s_height), (1000, 1000));
    assert_eq!((c.sx, c.sy), (500, 0));
}

#[test]
fn zoom_shrinks_the_crop_around_position() {
    let vp = Viewport::new(0.0, 100.0, 2.0);
    let c = source_crop(2000, 1000, &vp, 100.0, 100.0);
    assert_eq!((c.s_width, c.s_height), (500, 500));
    assert_eq!((c.sx, c.sy), (0, 500));
}

#[test]
fn crop_depends_only_on_target_aspect() {
    let vp = Viewport::new(37.0, 61.0, 1.7);
    let small = source_crop(4032, 3024, &vp, 640.0, 360.0);
    let big = source_crop(4032, 3024, &vp, 1920.0, 1080.0);
    assert_eq!(small, big);
}

#[test]
fn recomputation_is_idempotent() {
    let vp = Viewport::new(12.0, 88.0, 2.4);
    let a = source_crop(1234, 987, &vp, 1333.5, 2000.0);
    let b = source_crop(1234, 987, &vp, 1333.5, 2000.0);
    assert_eq!(a, b);
}

#[test]
fn crop_stays_inside_the_source() {
    for &(w, h) in &[(1, 1), (3, 7000), (5000, 2), (999, 1001)] {
        for &pos in &[0.0, 50.0, 100.0] {
            for &zoom in &[1.0, 2.0, 3.0] {
                let c = source_crop(w, h, &Viewport::new(pos, pos, zoom), 1920.0, 1080.0);
                assert!(c.s_width >= 1 && c.s_height >= 1);
                assert!(c.sx + c.s_width <= w, "{w}x{h} pos={pos} zoom={zoom}: {c:?}");
                assert!(c.sy + c.s_height <= h, "{w}x{h} pos={pos} zoom={zoom}: {c:?}");
            }
        }
    }
}

#[test]
fn degenerate_target_falls_back_to_image_aspect() {
    let c = source_crop(800, 600, &Viewport::default(), 0.0, 0.0);
    assert_eq!((c.s_width, c.s_height), (800, 600));
}
