use std::f64::consts::FRAC_PI_2;

use crate::compose::settings::AspectRatio;
use crate::foundation::core::{Canvas, Point, Rect};

/// Narrowest aspect `auto` may produce.
pub const AUTO_MIN_ASPECT: f64 = 4.0 / 3.0;
/// Widest aspect `auto` may produce.
pub const AUTO_MAX_ASPECT: f64 = 21.0 / 9.0;
/// Minimum output height for fixed ratios.
pub const FIXED_MIN_HEIGHT: u32 = 1080;
/// Default width cap for on-screen previews.
pub const DEFAULT_PREVIEW_MAX_WIDTH: u32 = 1200;

const ARROW_SIZE_FACTOR: f64 = 0.12;

/// Natural output canvas for the chosen ratio and the two source sizes `(width, height)`.
///
/// `auto` averages the two source aspect ratios, clamps to `[4/3, 21/9]` and keeps the taller
/// source's height. Fixed ratios keep `max(h1, h2, 1080)` as the height.
pub fn canvas_dimensions(ratio: AspectRatio, first: (u32, u32), second: (u32, u32)) -> Canvas {
    let h1 = first.1.max(1);
    let h2 = second.1.max(1);
    let (base_h, aspect) = match ratio.terms() {
        None => {
            let a1 = f64::from(first.0) / f64::from(h1);
            let a2 = f64::from(second.0) / f64::from(h2);
            let avg = ((a1 + a2) / 2.0).clamp(AUTO_MIN_ASPECT, AUTO_MAX_ASPECT);
            (h1.max(h2), avg)
        }
        Some((rw, rh)) => (
            h1.max(h2).max(FIXED_MIN_HEIGHT),
            f64::from(rw) / f64::from(rh),
        ),
    };
    let width = (f64::from(base_h) * aspect).round().max(1.0) as u32;
    Canvas {
        width,
        height: base_h,
    }
}

/// Which output a layout is planned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Downscaled on-screen preview.
    Preview {
        /// Width cap in pixels.
        max_width: u32,
    },
    /// Full-resolution export.
    Export,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::Preview {
            max_width: DEFAULT_PREVIEW_MAX_WIDTH,
        }
    }
}

/// Horizontal anchoring of a label's origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelAlign {
    /// Origin is the label's top-left corner.
    Start,
    /// Origin is the label's top-right corner.
    End,
}

/// Where one label goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Top anchor point in output pixels.
    pub origin: Point,
    /// How `origin` relates to the text box.
    pub align: LabelAlign,
}

/// Where the arrow glyph goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowPlacement {
    /// Glyph center (the seam midpoint).
    pub center: Point,
    /// Reference size; every glyph dimension is a multiple of it.
    pub size: f64,
    /// Clockwise rotation in radians.
    pub rotation: f64,
}

/// Fully resolved placement of every element of a composite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeLayout {
    /// Canvas size before any preview downscale.
    pub natural: Canvas,
    /// Raster size actually produced.
    pub output: Canvas,
    /// Top/bottom split when true, side by side otherwise.
    pub vertical: bool,
    /// Destination rectangles of the first and second source.
    pub halves: [Rect; 2],
    /// Label font size in output pixels.
    pub font_size: f64,
    /// Outline stroke width behind label glyphs.
    pub outline_width: f64,
    /// Label anchors for the first and second half.
    pub labels: [LabelPlacement; 2],
    /// Arrow anchor.
    pub arrow: ArrowPlacement,
}

/// Preview raster size: width capped at `max_width`, aspect preserved.
pub fn preview_canvas(natural: Canvas, max_width: u32) -> Canvas {
    let max_width = max_width.max(1);
    if natural.width <= max_width {
        return natural;
    }
    let scale = f64::from(max_width) / f64::from(natural.width);
    Canvas {
        width: (f64::from(natural.width) * scale).round().max(1.0) as u32,
        height: (f64::from(natural.height) * scale).round().max(1.0) as u32,
    }
}

/// Plan halves, labels and arrow for a natural canvas in the given mode.
pub fn plan_layout(natural: Canvas, mode: RenderMode) -> CompositeLayout {
    let output = match mode {
        RenderMode::Preview { max_width } => preview_canvas(natural, max_width),
        RenderMode::Export => natural,
    };
    let w = f64::from(output.width);
    let h = f64::from(output.height);
    let min_side = f64::from(output.min_side());
    let vertical = output.is_vertical();

    let (font_size, padding, outline_width) = match mode {
        RenderMode::Export => {
            let fs = (min_side * 0.05).max(24.0);
            (fs, fs * 0.5, fs * 0.1)
        }
        RenderMode::Preview { .. } => {
            let fs = (min_side * 0.08).max(48.0);
            (fs, fs * 0.4, (fs * 0.1).max(2.0))
        }
    };

    let (halves, labels) = if vertical {
        let half_h = h / 2.0;
        (
            [
                Rect::new(0.0, 0.0, w, half_h),
                Rect::new(0.0, half_h, w, h),
            ],
            [
                LabelPlacement {
                    origin: Point::new(padding, padding),
                    align: LabelAlign::Start,
                },
                LabelPlacement {
                    origin: Point::new(padding, half_h + padding),
                    align: LabelAlign::Start,
                },
            ],
        )
    } else {
        let half_w = w / 2.0;
        (
            [
                Rect::new(0.0, 0.0, half_w, h),
                Rect::new(half_w, 0.0, w, h),
            ],
            [
                LabelPlacement {
                    origin: Point::new(padding, padding),
                    align: LabelAlign::Start,
                },
                LabelPlacement {
                    origin: Point::new(w - padding, padding),
                    align: LabelAlign::End,
                },
            ],
        )
    };

    CompositeLayout {
        natural,
        output,
        vertical,
        halves,
        font_size,
        outline_width,
        labels,
        arrow: ArrowPlacement {
            center: Point::new(w / 2.0, h / 2.0),
            size: min_side * ARROW_SIZE_FACTOR,
            rotation: if vertical { FRAC_PI_2 } else { 0.0 },
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
