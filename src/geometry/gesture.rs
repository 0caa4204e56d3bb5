use crate::foundation::core::{Point, Size, Vec2};
use crate::geometry::cover::{
    ViewTransform, max_offset, scale_extent, transform_for_viewport, viewport_for_transform,
};
use crate::geometry::viewport::Viewport;

/// Continuous pan/zoom state for one image inside one frame.
///
/// Ticks (`pan_by`, `zoom_by`) mutate only the live transform and return the normalized viewport
/// it corresponds to. [`PanZoomGesture::end`] yields that viewport exactly once per gesture so the
/// caller can commit it. Discrete actions (`reset`, `set_viewport`) go through the same
/// viewport-to-transform path used at construction.
#[derive(Clone, Debug)]
pub struct PanZoomGesture {
    image: Size,
    frame: Size,
    transform: ViewTransform,
    active: bool,
}

impl PanZoomGesture {
    /// Start from a stored viewport.
    pub fn new(image: Size, frame: Size, viewport: &Viewport) -> Self {
        Self {
            image,
            frame,
            transform: transform_for_viewport(image, frame, &viewport.sanitized()),
            active: false,
        }
    }

    /// Current on-screen transform.
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Frame size the transform is computed for.
    pub fn frame(&self) -> Size {
        self.frame
    }

    /// Normalized viewport for the current transform.
    pub fn viewport(&self) -> Viewport {
        viewport_for_transform(self.image, self.frame, &self.transform)
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the start of a drag / wheel / pinch sequence.
    pub fn begin(&mut self) {
        self.active = true;
    }

    /// Translate by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) -> Viewport {
        self.active = true;
        self.transform.translate += delta;
        self.clamp_translate();
        self.viewport()
    }

    /// Multiply the scale by `factor`, keeping the image point under `anchor` fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> Viewport {
        self.active = true;
        if !factor.is_finite() || factor <= 0.0 {
            return self.viewport();
        }
        let (lo, hi) = scale_extent(self.image, self.frame);
        let old = self.transform.scale;
        let new = (old * factor).clamp(lo, hi);

        // Image-space point under the anchor before the zoom.
        let image_x = (anchor.x - self.transform.translate.x) / old;
        let image_y = (anchor.y - self.transform.translate.y) / old;

        self.transform.scale = new;
        self.transform.translate = Vec2::new(anchor.x - image_x * new, anchor.y - image_y * new);
        self.clamp_translate();
        self.viewport()
    }

    /// Finish the gesture; returns the viewport to commit, once.
    pub fn end(&mut self) -> Option<Viewport> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.viewport())
    }

    /// Jump to a viewport through the standard derivation path.
    pub fn set_viewport(&mut self, viewport: &Viewport) -> Viewport {
        self.active = false;
        self.transform = transform_for_viewport(self.image, self.frame, &viewport.sanitized());
        self.viewport()
    }

    /// Return to centered, unzoomed.
    pub fn reset(&mut self) -> Viewport {
        self.set_viewport(&Viewport::default())
    }

    /// Re-derive the transform for a new frame size, preserving the normalized viewport.
    pub fn resize(&mut self, frame: Size) {
        let vp = self.viewport();
        self.frame = frame;
        self.transform = transform_for_viewport(self.image, frame, &vp);
    }

    fn clamp_translate(&mut self) {
        let scale = self.transform.scale;
        let max_x = max_offset(self.image.width * scale, self.frame.width);
        let max_y = max_offset(self.image.height * scale, self.frame.height);
        let t = &mut self.transform.translate;
        t.x = t.x.clamp(-max_x, 0.0);
        t.y = t.y.clamp(-max_y, 0.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/gesture.rs"]
mod tests;
