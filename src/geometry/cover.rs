use crate::foundation::core::{Affine, Size, Vec2};
use crate::geometry::viewport::{CENTER, MAX_ZOOM, Viewport, clamp_position, clamp_zoom};

/// Scale at which an image of `image` size exactly covers a frame of `frame` size.
///
/// Degenerate sizes (zero or non-finite) yield `1.0`.
pub fn cover_scale(image: Size, frame: Size) -> f64 {
    if !is_usable(image) || !is_usable(frame) {
        return 1.0;
    }
    (frame.width / image.width).max(frame.height / image.height)
}

/// Pan range along one axis once the image is scaled to `scaled` pixels.
pub fn max_offset(scaled: f64, frame: f64) -> f64 {
    (scaled - frame).max(0.0)
}

/// Translation (non-positive) for a position percentage along one axis.
pub fn offset_for_position(max_offset: f64, pos: f64) -> f64 {
    if max_offset <= 0.0 {
        return 0.0;
    }
    -(max_offset * pos / 100.0)
}

/// Inverse of [`offset_for_position`]; with no pan range the position is centered.
pub fn position_for_offset(offset: f64, max_offset: f64) -> f64 {
    if max_offset <= 0.0 {
        return CENTER;
    }
    clamp_position((-offset / max_offset) * 100.0)
}

/// Pixel-space transform of an image inside its frame: scale about the origin, then translate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Absolute scale (cover scale times zoom).
    pub scale: f64,
    /// Translation of the scaled image's top-left corner, both components `<= 0`.
    pub translate: Vec2,
}

impl ViewTransform {
    /// As an affine mapping image pixels to frame pixels.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }
}

/// Derive the on-screen transform for a normalized viewport.
pub fn transform_for_viewport(image: Size, frame: Size, viewport: &Viewport) -> ViewTransform {
    let cover = cover_scale(image, frame);
    let scale = cover * clamp_zoom(viewport.zoom);
    let max_x = max_offset(image.width * scale, frame.width);
    let max_y = max_offset(image.height * scale, frame.height);
    ViewTransform {
        scale,
        translate: Vec2::new(
            offset_for_position(max_x, clamp_position(viewport.x_pos)),
            offset_for_position(max_y, clamp_position(viewport.y_pos)),
        ),
    }
}

/// Recover the normalized viewport from an on-screen transform.
pub fn viewport_for_transform(image: Size, frame: Size, transform: &ViewTransform) -> Viewport {
    let cover = cover_scale(image, frame);
    let zoom = clamp_zoom(transform.scale / cover);
    let scale = cover * zoom;
    let max_x = max_offset(image.width * scale, frame.width);
    let max_y = max_offset(image.height * scale, frame.height);
    Viewport {
        x_pos: position_for_offset(transform.translate.x, max_x),
        y_pos: position_for_offset(transform.translate.y, max_y),
        zoom,
    }
}

/// Scale bounds allowed during a gesture.
pub fn scale_extent(image: Size, frame: Size) -> (f64, f64) {
    let cover = cover_scale(image, frame);
    (cover, cover * MAX_ZOOM)
}

fn is_usable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/cover.rs"]
mod tests;
