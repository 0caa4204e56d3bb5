//! Viewport geometry engine.
//!
//! Converts between the normalized per-slot viewport (position percentages and a zoom over
//! cover-fit) and the pixel transform of an image inside a frame of arbitrary size.

/// Cover-fit scale and offset math.
pub mod cover;
/// Continuous pan/zoom gestures.
pub mod gesture;
/// Normalized viewport value type.
pub mod viewport;
