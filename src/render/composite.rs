use crate::assets::decode::DecodedImage;
use crate::compose::crop::{SourceCrop, source_crop};
use crate::compose::layout::{CompositeLayout, RenderMode, canvas_dimensions, plan_layout};
use crate::compose::settings::Settings;
use crate::foundation::core::{Affine, Rect, Rgba8, Vec2};
use crate::foundation::error::{ThenNowError, ThenNowResult};
use crate::geometry::viewport::Viewport;
use crate::render::arrow::{GlyphOp, arrow_glyph};
use crate::render::frame::FrameRGBA;
use crate::render::text::{LabelPainter, LabelStyle, color_to_cpu};

/// One source image and how it is framed.
#[derive(Clone, Copy, Debug)]
pub struct SourceView<'a> {
    /// Decoded content.
    pub image: &'a DecodedImage,
    /// Normalized pan/zoom.
    pub viewport: Viewport,
}

/// Everything a composite depends on.
#[derive(Clone, Copy, Debug)]
pub struct CompositeInput<'a> {
    /// First ("before") source.
    pub first: SourceView<'a>,
    /// Second ("after") source.
    pub second: SourceView<'a>,
    /// Labels, arrow and aspect ratio.
    pub settings: &'a Settings,
}

impl CompositeInput<'_> {
    /// Resolve canvas size and element placement without rasterizing.
    pub fn plan(&self, mode: RenderMode) -> CompositeLayout {
        let natural = canvas_dimensions(
            self.settings.aspect_ratio,
            (self.first.image.width, self.first.image.height),
            (self.second.image.width, self.second.image.height),
        );
        plan_layout(natural, mode)
    }

    /// Source crops for both halves of `layout`.
    pub fn crops(&self, layout: &CompositeLayout) -> [SourceCrop; 2] {
        let crop = |view: &SourceView<'_>, half: Rect| {
            source_crop(
                view.image.width,
                view.image.height,
                &view.viewport,
                half.width(),
                half.height(),
            )
        };
        [
            crop(&self.first, layout.halves[0]),
            crop(&self.second, layout.halves[1]),
        ]
    }
}

/// CPU compositor for before/after frames.
///
/// The `vello_cpu` render context is kept between calls and reused while the output size is
/// unchanged.
pub struct CompositeRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    labels: LabelPainter,
}

impl std::fmt::Debug for CompositeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRenderer")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl Default for CompositeRenderer {
    fn default() -> Self {
        Self::new(LabelPainter::bitmap())
    }
}

impl CompositeRenderer {
    /// Renderer drawing labels with `labels`.
    pub fn new(labels: LabelPainter) -> Self {
        Self { ctx: None, labels }
    }

    /// Rasterize a composite.
    ///
    /// Errors leave nothing behind; callers keep whatever frame they had.
    #[tracing::instrument(skip(self, input), fields(aspect = %input.settings.aspect_ratio))]
    pub fn render(
        &mut self,
        input: &CompositeInput<'_>,
        mode: RenderMode,
    ) -> ThenNowResult<FrameRGBA> {
        let layout = input.plan(mode);
        let width: u16 = layout.output.width.try_into().map_err(|_| {
            ThenNowError::render(format!(
                "output width {} exceeds rasterizer limit",
                layout.output.width
            ))
        })?;
        let height: u16 = layout.output.height.try_into().map_err(|_| {
            ThenNowError::render(format!(
                "output height {} exceeds rasterizer limit",
                layout.output.height
            ))
        })?;
        let crops = input.crops(&layout);

        let frame = self.with_ctx_mut(width, height, |labels, ctx| {
            ctx.set_transform(Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(Rgba8::BLACK));
            ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(width), f64::from(height)));

            draw_half(ctx, &input.first, &crops[0], layout.halves[0]);
            draw_half(ctx, &input.second, &crops[1], layout.halves[1]);

            let style = LabelStyle::outlined(layout.font_size, layout.outline_width);
            labels.draw(ctx, &input.settings.before_label, &layout.labels[0], &style)?;
            labels.draw(ctx, &input.settings.after_label, &layout.labels[1], &style)?;

            let glyph = arrow_glyph(
                input.settings.arrow_style,
                &layout.arrow,
                input.settings.arrow_color.rgba(),
            );
            paint_glyph(ctx, &glyph);

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width: u32::from(width),
                height: u32::from(height),
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })?;

        tracing::debug!(
            width = frame.width,
            height = frame.height,
            vertical = layout.vertical,
            "composite rendered"
        );
        Ok(frame)
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut LabelPainter, &mut vello_cpu::RenderContext) -> ThenNowResult<R>,
    ) -> ThenNowResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut self.labels, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

/// Map the crop rectangle of `view` onto `half` and fill it with the image.
fn draw_half(
    ctx: &mut vello_cpu::RenderContext,
    view: &SourceView<'_>,
    crop: &SourceCrop,
    half: Rect,
) {
    let sx = f64::from(crop.sx);
    let sy = f64::from(crop.sy);
    let sw = f64::from(crop.s_width);
    let sh = f64::from(crop.s_height);
    let xf = Affine::translate(Vec2::new(half.x0, half.y0))
        * Affine::scale_non_uniform(half.width() / sw, half.height() / sh)
        * Affine::translate(Vec2::new(-sx, -sy));
    ctx.set_transform(xf);
    ctx.set_paint(view.image.paint());
    ctx.fill_rect(&Rect::new(sx, sy, sx + sw, sy + sh));
}

/// Execute glyph drawing steps in order.
pub(crate) fn paint_glyph(ctx: &mut vello_cpu::RenderContext, ops: &[GlyphOp]) {
    ctx.set_transform(Affine::IDENTITY);
    for op in ops {
        match op {
            GlyphOp::Fill { path, color } => {
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(path);
            }
            GlyphOp::Stroke {
                path,
                color,
                stroke,
            } => {
                ctx.set_stroke(stroke.clone());
                ctx.set_paint(color_to_cpu(*color));
                ctx.stroke_path(path);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
