use std::io::Cursor;

use super::*;

fn encode_png(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let decoded = decode_image(&encode_png(img)).unwrap();
    assert_eq!((decoded.width, decoded.height), (1, 1));
    assert_eq!(
        decoded.premul_bytes(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, ThenNowError::Decode(_)));
    assert!(err.to_string().contains("may be corrupted"));
}

#[test]
fn size_reports_pixels() {
    let img = image::RgbaImage::from_pixel(7, 3, image::Rgba([1, 2, 3, 255]));
    let decoded = from_rgba(img).unwrap();
    assert_eq!(decoded.size(), Size::new(7.0, 3.0));
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![10, 20, 30, 255, 99, 99, 99, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremultiply_restores_half_alpha_approximately() {
    let mut px = vec![200, 100, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert!((i16::from(px[0]) - 200).abs() <= 2);
    assert!((i16::from(px[1]) - 100).abs() <= 2);
    assert_eq!(px[3], 128);
}

#[test]
fn pixmap_rejects_mismatched_length() {
    assert!(pixmap_from_premul_bytes(&[0, 0, 0], 1, 1).is_err());
    assert!(pixmap_from_premul_bytes(&[], 0, 0).is_err());
}
