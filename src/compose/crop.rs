use crate::geometry::viewport::{Viewport, clamp_position, clamp_zoom};

/// Source-pixel rectangle to sample from one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCrop {
    /// Left edge in source pixels.
    pub sx: u32,
    /// Top edge in source pixels.
    pub sy: u32,
    /// Width in source pixels, at least 1.
    pub s_width: u32,
    /// Height in source pixels, at least 1.
    pub s_height: u32,
}

/// Crop rectangle of an `image_w x image_h` source for a `target_w x target_h` region.
///
/// The crop has the target's aspect ratio (cover semantics), shrinks by the viewport zoom, and is
/// placed inside the source by the viewport's position percentages. The result depends only on
/// the target aspect ratio, so preview and export sample the same region.
pub fn source_crop(
    image_w: u32,
    image_h: u32,
    viewport: &Viewport,
    target_w: f64,
    target_h: f64,
) -> SourceCrop {
    let img_w = f64::from(image_w.max(1));
    let img_h = f64::from(image_h.max(1));
    let image_aspect = img_w / img_h;
    let usable = target_w.is_finite() && target_h.is_finite() && target_w > 0.0 && target_h > 0.0;
    let target_aspect = if usable {
        target_w / target_h
    } else {
        image_aspect
    };

    let (mut crop_w, mut crop_h) = if target_aspect >= image_aspect {
        (img_w, img_w / target_aspect)
    } else {
        (img_h * target_aspect, img_h)
    };

    let zoom = clamp_zoom(viewport.zoom);
    crop_w = (crop_w / zoom).min(img_w);
    crop_h = (crop_h / zoom).min(img_h);

    let max_x = (img_w - crop_w).max(0.0);
    let max_y = (img_h - crop_h).max(0.0);
    let sx = (max_x * clamp_position(viewport.x_pos) / 100.0).clamp(0.0, max_x);
    let sy = (max_y * clamp_position(viewport.y_pos) / 100.0).clamp(0.0, max_y);

    let s_width = (crop_w.round() as u32).clamp(1, image_w.max(1));
    let s_height = (crop_h.round() as u32).clamp(1, image_h.max(1));
    let sx = (sx.round() as u32).min(image_w.max(1) - s_width);
    let sy = (sy.round() as u32).min(image_h.max(1) - s_height);

    SourceCrop {
        sx,
        sy,
        s_width,
        s_height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/crop.rs"]
mod tests;
