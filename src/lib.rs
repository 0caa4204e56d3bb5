//! then-and-now composes a single before/after comparison image from two photographs.
//!
//! Each source is framed with a normalized pan/zoom viewport, the pair is laid out side by side
//! or stacked depending on the output aspect, and labels plus an arrow glyph are drawn on top.
//! Slot content and viewports persist across sessions in a two-tier store that degrades to
//! session memory when storage is unavailable.
//!
//! The entry point is [`Workspace`]:
//!
//! - Open it with [`WorkspaceOpts`] (or [`Workspace::in_memory`])
//! - Upload content into the two [`SlotId`]s and adjust viewports
//! - Render a preview or export a PNG
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod workspace;

/// Upload intake and decoding.
pub mod assets;
/// Composite planning.
pub mod compose;
pub mod config;
/// Viewport geometry.
pub mod geometry;
/// Rasterization.
pub mod render;
/// Slot state.
pub mod slots;
/// Persistence.
pub mod store;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{ThenNowError, ThenNowResult};

pub use crate::assets::ingest::{DeviceClass, Upload};
pub use crate::compose::settings::{ArrowColor, ArrowStyle, AspectRatio, Settings};
pub use crate::config::WorkspaceOpts;
pub use crate::geometry::viewport::Viewport;
pub use crate::render::frame::FrameRGBA;
pub use crate::slots::controller::{ContentOrigin, HydrateOutcome, SlotPhase};
pub use crate::slots::slot::SlotId;
pub use crate::store::records::WriteOutcome;
pub use crate::workspace::{SlotStatus, Workspace};
