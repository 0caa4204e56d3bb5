use crate::assets::decode::from_rgba;
use crate::compose::settings::{ArrowColor, ArrowStyle, AspectRatio};
use crate::foundation::core::Canvas;

use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DecodedImage {
    from_rgba(image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))).unwrap()
}

fn bare_settings(aspect_ratio: AspectRatio) -> Settings {
    Settings {
        aspect_ratio,
        before_label: String::new(),
        after_label: String::new(),
        arrow_style: ArrowStyle::None,
        arrow_color: ArrowColor::White,
    }
}

fn input<'a>(a: &'a DecodedImage, b: &'a DecodedImage, s: &'a Settings) -> CompositeInput<'a> {
    CompositeInput {
        first: SourceView {
            image: a,
            viewport: Viewport::default(),
        },
        second: SourceView {
            image: b,
            viewport: Viewport::default(),
        },
        settings: s,
    }
}

#[test]
fn horizontal_composite_places_sources_side_by_side() {
    let a = solid(200, 100, RED);
    let b = solid(100, 200, BLUE);
    let s = bare_settings(AspectRatio::Auto);
    let mut r = CompositeRenderer::default();
    let frame = r.render(&input(&a, &b, &s), RenderMode::Export).unwrap();
    assert_eq!(frame.canvas(), Canvas { width: 267, height: 200 });
    assert_eq!(frame.pixel(10, 100), Some(RED));
    assert_eq!(frame.pixel(250, 100), Some(BLUE));
    assert_eq!(frame.pixel(120, 5), Some(RED));
}

#[test]
fn vertical_composite_stacks_sources() {
    let a = solid(200, 100, RED);
    let b = solid(100, 200, BLUE);
    let s = bare_settings(AspectRatio::Portrait9x16);
    let mut r = CompositeRenderer::default();
    let frame = r.render(&input(&a, &b, &s), RenderMode::Export).unwrap();
    assert_eq!(frame.canvas(), Canvas { width: 608, height: 1080 });
    assert_eq!(frame.pixel(300, 100), Some(RED));
    assert_eq!(frame.pixel(300, 1000), Some(BLUE));
}

#[test]
fn classic_arrow_covers_the_seam() {
    let a = solid(200, 100, RED);
    let b = solid(100, 200, BLUE);
    let mut s = bare_settings(AspectRatio::Auto);
    s.arrow_style = ArrowStyle::Classic;
    let mut r = CompositeRenderer::default();
    let frame = r.render(&input(&a, &b, &s), RenderMode::Export).unwrap();
    assert_eq!(frame.pixel(133, 100), Some([255, 255, 255, 255]));
}

#[test]
fn labels_are_drawn_in_white() {
    let a = solid(400, 200, RED);
    let b = solid(400, 200, BLUE);
    let mut s = bare_settings(AspectRatio::Auto);
    s.before_label = "I".into();
    let mut r = CompositeRenderer::default();
    let frame = r.render(&input(&a, &b, &s), RenderMode::Export).unwrap();
    // Export font 24px on a 400x200 canvas, padding 12, 8x8 cells of 3px.
    // Row 1 of 'I' lights columns 2..=3.
    assert_eq!(frame.pixel(12 + 7, 12 + 4), Some([255, 255, 255, 255]));
}

#[test]
fn preview_is_capped_and_export_is_not() {
    let a = solid(3000, 1500, RED);
    let b = solid(3000, 1500, BLUE);
    let s = bare_settings(AspectRatio::Auto);
    let i = input(&a, &b, &s);
    let mut r = CompositeRenderer::default();
    let preview = r.render(&i, RenderMode::default()).unwrap();
    assert_eq!(preview.canvas(), Canvas { width: 1200, height: 600 });
    let plan = i.plan(RenderMode::Export);
    assert_eq!(plan.output, Canvas { width: 3000, height: 1500 });
}

#[test]
fn crops_match_between_preview_and_export() {
    let a = solid(640, 480, RED);
    let b = solid(480, 640, BLUE);
    let s = bare_settings(AspectRatio::Landscape16x9);
    let mut i = input(&a, &b, &s);
    i.first.viewport = Viewport::new(20.0, 70.0, 2.0);
    let export = i.crops(&i.plan(RenderMode::Export));
    let preview = i.crops(&i.plan(RenderMode::Preview { max_width: 1000 }));
    assert_eq!(export, preview);
}

#[test]
fn oversize_canvas_is_a_render_error() {
    let a = solid(1, 65_535, RED);
    let b = solid(1, 65_535, BLUE);
    let s = bare_settings(AspectRatio::Auto);
    let mut r = CompositeRenderer::default();
    let err = r
        .render(&input(&a, &b, &s), RenderMode::Export)
        .unwrap_err();
    assert!(matches!(err, ThenNowError::Render(_)));
}

#[test]
fn context_is_reused_across_sizes() {
    let a = solid(200, 100, RED);
    let b = solid(200, 100, BLUE);
    let s = bare_settings(AspectRatio::Auto);
    let mut r = CompositeRenderer::default();
    let one = r.render(&input(&a, &b, &s), RenderMode::Export).unwrap();
    let two = r.render(&input(&a, &b, &s), RenderMode::Export).unwrap();
    assert_eq!(one, two);
    let s2 = bare_settings(AspectRatio::Landscape4x3);
    let three = r.render(&input(&a, &b, &s2), RenderMode::Export).unwrap();
    assert_eq!(three.canvas(), Canvas { width: 1440, height: 1080 });
}
