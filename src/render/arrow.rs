use kurbo::{Cap, Circle, Join, Shape as _, Stroke};

use crate::compose::layout::ArrowPlacement;
use crate::compose::settings::ArrowStyle;
use crate::foundation::core::{Affine, BezPath, Point, Rgba8};

const CIRCLE_TOLERANCE: f64 = 0.1;
const DARK_LUMA: f64 = 64.0;

/// One drawing step of a glyph, in output pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphOp {
    /// Fill `path` (non-zero) with `color`.
    Fill {
        /// Outline to fill.
        path: BezPath,
        /// Fill color.
        color: Rgba8,
    },
    /// Stroke `path` with `color` using `stroke`.
    Stroke {
        /// Outline to stroke.
        path: BezPath,
        /// Stroke color.
        color: Rgba8,
        /// Width, joins and caps.
        stroke: Stroke,
    },
}

/// Signature shared by every arrow style.
pub type GlyphBuilder = fn(&ArrowPlacement, Rgba8) -> Vec<GlyphOp>;

/// Pick the builder for a style.
pub fn glyph_builder(style: ArrowStyle) -> GlyphBuilder {
    match style {
        ArrowStyle::Classic => classic,
        ArrowStyle::Modern => modern,
        ArrowStyle::Minimal => minimal,
        ArrowStyle::None => none,
    }
}

/// Drawing steps for `style` at `placement` filled with `color`.
pub fn arrow_glyph(style: ArrowStyle, placement: &ArrowPlacement, color: Rgba8) -> Vec<GlyphOp> {
    glyph_builder(style)(placement, color)
}

/// Outline color for a fill: white around dark fills, black otherwise.
pub fn border_color(fill: Rgba8) -> Rgba8 {
    if fill.luma() < DARK_LUMA {
        Rgba8::WHITE
    } else {
        Rgba8::BLACK
    }
}

fn placement_transform(p: &ArrowPlacement) -> Affine {
    Affine::translate(p.center.to_vec2()) * Affine::rotate(p.rotation)
}

fn polygon(points: &[(f64, f64)], close: bool, xf: Affine) -> BezPath {
    let mut path = BezPath::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(Point::new(x, y));
        } else {
            path.line_to(Point::new(x, y));
        }
    }
    if close {
        path.close_path();
    }
    path.apply_affine(xf);
    path
}

/// Right-pointing block arrow centered on the origin, tail at `tail_x`.
fn block_arrow(tail_x: f64, width: f64, shaft: f64, head: f64, head_len: f64) -> [(f64, f64); 7] {
    let neck = width / 2.0 - head_len;
    [
        (tail_x, -shaft / 2.0),
        (neck, -shaft / 2.0),
        (neck, -head / 2.0),
        (width / 2.0, 0.0),
        (neck, head / 2.0),
        (neck, shaft / 2.0),
        (tail_x, shaft / 2.0),
    ]
}

fn classic(p: &ArrowPlacement, color: Rgba8) -> Vec<GlyphOp> {
    let s = p.size;
    let width = s * 1.4;
    let height = s * 0.8;
    let pts = block_arrow(-width / 2.0, width, height * 0.4, height, width * 0.4);
    let path = polygon(&pts, true, placement_transform(p));
    vec![
        GlyphOp::Stroke {
            path: path.clone(),
            color: border_color(color),
            stroke: Stroke::new((s * 0.05).max(3.0))
                .with_join(Join::Miter)
                .with_caps(Cap::Square),
        },
        GlyphOp::Fill { path, color },
    ]
}

fn modern(p: &ArrowPlacement, color: Rgba8) -> Vec<GlyphOp> {
    let s = p.size;
    let border = (s * 0.03).max(2.0);
    let xf = placement_transform(p);

    let mut badge = Circle::new(Point::ORIGIN, s * 0.7).to_path(CIRCLE_TOLERANCE);
    badge.apply_affine(xf);

    let width = s * 0.65;
    let height = s * 0.55;
    let pts = block_arrow(-width * 0.35, width, height * 0.45, height * 0.85, width * 0.4);
    let inner = polygon(&pts, true, xf);
    let inner_fill = if color == Rgba8::WHITE {
        Rgba8::BLACK
    } else {
        Rgba8::WHITE
    };

    vec![
        GlyphOp::Fill {
            path: badge.clone(),
            color,
        },
        GlyphOp::Stroke {
            path: badge,
            color: border_color(color),
            stroke: Stroke::new(border),
        },
        GlyphOp::Stroke {
            path: inner.clone(),
            color: Rgba8::BLACK,
            stroke: Stroke::new((border * 1.2).max(2.0))
                .with_join(Join::Miter)
                .with_caps(Cap::Square),
        },
        GlyphOp::Fill {
            path: inner,
            color: inner_fill,
        },
    ]
}

fn minimal(p: &ArrowPlacement, color: Rgba8) -> Vec<GlyphOp> {
    let s = p.size;
    let cw = s * 0.35;
    let ch = s * 0.6;
    let spacing = cw * 0.9;
    let width = (s * 0.08).max(6.0);
    let xf = placement_transform(p);
    let outline = border_color(color);

    let mut ops = Vec::with_capacity(6);
    for i in 0..3i32 {
        let off = f64::from(i - 1) * spacing;
        let chevron = polygon(
            &[
                (off - cw / 2.0, -ch / 2.0),
                (off + cw / 2.0, 0.0),
                (off - cw / 2.0, ch / 2.0),
            ],
            false,
            xf,
        );
        ops.push(GlyphOp::Stroke {
            path: chevron.clone(),
            color: outline,
            stroke: Stroke::new(width + 3.0)
                .with_join(Join::Round)
                .with_caps(Cap::Round),
        });
        ops.push(GlyphOp::Stroke {
            path: chevron,
            color,
            stroke: Stroke::new(width)
                .with_join(Join::Round)
                .with_caps(Cap::Round),
        });
    }
    ops
}

fn none(_: &ArrowPlacement, _: Rgba8) -> Vec<GlyphOp> {
    Vec::new()
}

#[cfg(test)]
#[path = "../../tests/unit/render/arrow.rs"]
mod tests;
