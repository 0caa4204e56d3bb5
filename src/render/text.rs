use std::path::Path;

use anyhow::Context as _;
use font8x8::{
    BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS, MISC_FONTS,
    SGA_FONTS, UnicodeFonts as _,
};
use kurbo::{Join, Shape as _, Stroke};

use crate::compose::layout::{LabelAlign, LabelPlacement};
use crate::foundation::core::{Affine, BezPath, Rect, Rgba8, Vec2};
use crate::foundation::error::{ThenNowError, ThenNowResult};

const BITMAP_CELLS: f64 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

/// Parley contexts bound to one registered font family.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and keep its family for later layouts.
    pub(crate) fn new(font_bytes: &[u8]) -> ThenNowResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ThenNowError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ThenNowError::validation("registered font family has no name"))?
            .to_string();
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Shape and lay out a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
    ) -> ThenNowResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ThenNowError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

/// Colors and widths for one label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
    /// Font size in output pixels.
    pub font_size: f64,
    /// Outline stroke width.
    pub outline_width: f64,
    /// Glyph fill.
    pub fill: Rgba8,
    /// Glyph outline, drawn first.
    pub outline: Rgba8,
}

impl LabelStyle {
    /// White text with a black outline.
    pub fn outlined(font_size: f64, outline_width: f64) -> Self {
        Self {
            font_size,
            outline_width,
            fill: Rgba8::WHITE,
            outline: Rgba8::BLACK,
        }
    }
}

enum LabelFace {
    Vector {
        engine: Box<TextLayoutEngine>,
        font: vello_cpu::peniko::FontData,
    },
    Bitmap,
}

/// Draws outlined label text with either a loaded font or the built-in 8x8 face.
pub struct LabelPainter {
    face: LabelFace,
}

impl std::fmt::Debug for LabelPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let face = match self.face {
            LabelFace::Vector { .. } => "vector",
            LabelFace::Bitmap => "bitmap",
        };
        f.debug_struct("LabelPainter").field("face", &face).finish()
    }
}

impl Default for LabelPainter {
    fn default() -> Self {
        Self::bitmap()
    }
}

impl LabelPainter {
    /// Painter using the built-in 8x8 bitmap face.
    pub fn bitmap() -> Self {
        Self {
            face: LabelFace::Bitmap,
        }
    }

    /// Painter using a TrueType/OpenType font.
    pub fn from_font_bytes(bytes: Vec<u8>) -> ThenNowResult<Self> {
        let engine = TextLayoutEngine::new(&bytes)?;
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        Ok(Self {
            face: LabelFace::Vector {
                engine: Box::new(engine),
                font,
            },
        })
    }

    /// Painter using a font file.
    pub fn from_font_path(path: &Path) -> ThenNowResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_font_bytes(bytes)
    }

    /// Whether a vector font is loaded.
    pub fn has_vector_font(&self) -> bool {
        matches!(self.face, LabelFace::Vector { .. })
    }

    /// Laid-out `(width, height)` of `text` at `font_size`.
    pub fn measure(&mut self, text: &str, font_size: f64) -> ThenNowResult<(f64, f64)> {
        match &mut self.face {
            LabelFace::Vector { engine, .. } => {
                let layout = engine.layout_line(text, font_size as f32)?;
                Ok((f64::from(layout.width()), f64::from(layout.height())))
            }
            LabelFace::Bitmap => Ok(bitmap_extent(text, font_size)),
        }
    }

    /// Draw `text` anchored at `placement`: outline first, then fill.
    pub(crate) fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        placement: &LabelPlacement,
        style: &LabelStyle,
    ) -> ThenNowResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let (width, _) = self.measure(text, style.font_size)?;
        let left = match placement.align {
            LabelAlign::Start => placement.origin.x,
            LabelAlign::End => placement.origin.x - width,
        };
        let origin = Affine::translate(Vec2::new(left, placement.origin.y));
        let outline = Stroke::new(style.outline_width).with_join(Join::Round);

        match &mut self.face {
            LabelFace::Vector { engine, font } => {
                let layout = engine.layout_line(text, style.font_size as f32)?;
                ctx.set_transform(origin);
                if style.outline_width > 0.0 {
                    ctx.set_stroke(outline);
                    ctx.set_paint(color_to_cpu(style.outline));
                    draw_runs(ctx, &layout, font, Pass::Outline);
                }
                ctx.set_paint(color_to_cpu(style.fill));
                draw_runs(ctx, &layout, font, Pass::Fill);
                Ok(())
            }
            LabelFace::Bitmap => {
                let mut path = bitmap_path(text, style.font_size);
                path.apply_affine(origin);
                ctx.set_transform(Affine::IDENTITY);
                if style.outline_width > 0.0 {
                    ctx.set_stroke(outline);
                    ctx.set_paint(color_to_cpu(style.outline));
                    ctx.stroke_path(&path);
                }
                ctx.set_paint(color_to_cpu(style.fill));
                ctx.fill_path(&path);
                Ok(())
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Pass {
    Outline,
    Fill,
}

fn draw_runs(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    pass: Pass,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            let builder = ctx.glyph_run(font).font_size(run.run().font_size());
            match pass {
                Pass::Outline => builder.stroke_glyphs(glyphs),
                Pass::Fill => builder.fill_glyphs(glyphs),
            }
        }
    }
}

pub(crate) fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// 8x8 rows for `ch`, searching every `font8x8` table before substituting `?`.
fn bitmap_glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| HIRAGANA_FONTS.get(ch))
        .or_else(|| MISC_FONTS.get(ch))
        .or_else(|| SGA_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
}

// Every char takes one cell, including ones drawn as the `?` substitute.
fn bitmap_extent(text: &str, font_size: f64) -> (f64, f64) {
    let cell = font_size / BITMAP_CELLS;
    let advance = text.chars().filter(|&c| bitmap_glyph(c).is_some()).count() as f64;
    (advance * BITMAP_CELLS * cell, BITMAP_CELLS * cell)
}

/// Lit cells of the 8x8 face as one path, top-left at the origin.
pub(crate) fn bitmap_path(text: &str, font_size: f64) -> BezPath {
    let cell = font_size / BITMAP_CELLS;
    let mut path = BezPath::new();
    for (i, glyph) in text.chars().filter_map(bitmap_glyph).enumerate() {
        let x0 = i as f64 * BITMAP_CELLS * cell;
        for (row_idx, row) in glyph.iter().enumerate() {
            for col_idx in 0..8u8 {
                if (*row >> col_idx) & 1 == 0 {
                    continue;
                }
                let x = x0 + f64::from(col_idx) * cell;
                let y = row_idx as f64 * cell;
                path.extend(Rect::new(x, y, x + cell, y + cell).path_elements(0.1));
            }
        }
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
