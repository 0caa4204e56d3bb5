//! Upload intake and image decoding.

/// Byte decoding into render-ready pixmaps.
pub mod decode;
/// Upload validation, HEIF conversion and downscaling.
pub mod ingest;
