/// Smallest stored zoom (image exactly covers its frame).
pub const MIN_ZOOM: f64 = 1.0;
/// Largest stored zoom.
pub const MAX_ZOOM: f64 = 3.0;
/// Increment used by discrete zoom-in / zoom-out controls.
pub const ZOOM_STEP: f64 = 0.1;
/// Centered position percentage.
pub const CENTER: f64 = 50.0;

const DEFAULT_EPSILON: f64 = 0.1;

/// Normalized per-slot viewport.
///
/// Positions are percentages of the available pan range (`0` = left/top edge aligned,
/// `100` = right/bottom edge aligned); zoom is relative to cover-fit. The representation is
/// independent of both frame size and image resolution, which is what makes it persistable.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Horizontal position in `[0, 100]`.
    pub x_pos: f64,
    /// Vertical position in `[0, 100]`.
    pub y_pos: f64,
    /// Zoom multiplier over cover-fit in `[1, 3]`.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x_pos: CENTER,
            y_pos: CENTER,
            zoom: MIN_ZOOM,
        }
    }
}

impl Viewport {
    /// Build a viewport with every component clamped into range.
    pub fn new(x_pos: f64, y_pos: f64, zoom: f64) -> Self {
        Self {
            x_pos: clamp_position(x_pos),
            y_pos: clamp_position(y_pos),
            zoom: clamp_zoom(zoom),
        }
    }

    /// Re-clamp a viewport that may have come from untrusted storage.
    pub fn sanitized(self) -> Self {
        Self::new(self.x_pos, self.y_pos, self.zoom)
    }

    /// Centered, unzoomed.
    pub fn is_default(&self) -> bool {
        self.zoom == MIN_ZOOM
            && (self.x_pos - CENTER).abs() < DEFAULT_EPSILON
            && (self.y_pos - CENTER).abs() < DEFAULT_EPSILON
    }

    /// Same position, zoom stepped up by [`ZOOM_STEP`].
    pub fn zoomed_in(self) -> Self {
        self.with_zoom(self.zoom + ZOOM_STEP)
    }

    /// Same position, zoom stepped down by [`ZOOM_STEP`].
    pub fn zoomed_out(self) -> Self {
        self.with_zoom(self.zoom - ZOOM_STEP)
    }

    /// Same position, new (clamped) zoom.
    pub fn with_zoom(self, zoom: f64) -> Self {
        Self {
            zoom: clamp_zoom(round_step(zoom)),
            ..self
        }
    }

    /// Same zoom, new (clamped) position.
    pub fn with_position(self, x_pos: f64, y_pos: f64) -> Self {
        Self {
            x_pos: clamp_position(x_pos),
            y_pos: clamp_position(y_pos),
            ..self
        }
    }
}

/// Clamp a zoom into `[1, 3]`; non-finite input falls back to 1.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if !zoom.is_finite() || zoom < MIN_ZOOM {
        return MIN_ZOOM;
    }
    zoom.min(MAX_ZOOM)
}

/// Clamp a position percentage into `[0, 100]`; non-finite input falls back to center.
pub fn clamp_position(pos: f64) -> f64 {
    if !pos.is_finite() {
        return CENTER;
    }
    pos.clamp(0.0, 100.0)
}

// Snap to 1e-6 so repeated steps land exactly on the bounds.
fn round_step(zoom: f64) -> f64 {
    (zoom * 1e6).round() / 1e6
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/viewport.rs"]
mod tests;
