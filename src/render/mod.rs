//! CPU rasterization of composites.
//!
//! The compositor draws with `vello_cpu`: two cropped sources, outlined labels and an arrow glyph.
//! Output frames are premultiplied RGBA8 and can be encoded to PNG.

/// Arrow glyph shapes.
pub mod arrow;
/// The compositor.
pub mod composite;
/// Rendered frames and PNG export.
pub mod frame;
/// Outlined label text.
pub mod text;
