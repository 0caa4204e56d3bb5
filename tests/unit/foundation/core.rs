use super::*;

#[test]
fn canvas_orientation() {
    let canvas = |width, height| Canvas { width, height };
    assert!(canvas(1000, 1800).is_vertical());
    assert!(!canvas(1800, 1000).is_vertical());
    assert!(!canvas(1000, 1000).is_vertical());
}

#[test]
fn canvas_min_side() {
    assert_eq!(Canvas { width: 2667, height: 2000 }.min_side(), 2000);
    assert_eq!(Canvas { width: 608, height: 1080 }.min_side(), 608);
}

#[test]
fn rgba_hex_and_luma() {
    assert_eq!(Rgba8::opaque(0xef, 0x44, 0x44).to_hex(), "#ef4444");
    assert!(Rgba8::WHITE.luma() > 254.0);
    assert_eq!(Rgba8::BLACK.luma(), 0.0);
}
