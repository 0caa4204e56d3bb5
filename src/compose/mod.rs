//! Composite planning: canvas sizing, crop rectangles and element placement.
//!
//! Everything here is pure arithmetic over sizes and viewports; rasterization lives in
//! [`crate::render`].

/// Source-pixel crop rectangles for cover-fit halves.
pub mod crop;
/// Canvas sizing and element placement.
pub mod layout;
/// Persisted composite settings.
pub mod settings;
