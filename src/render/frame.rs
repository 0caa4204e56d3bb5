use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ThenNowError, ThenNowResult};

/// A rendered composite as RGBA8 pixels.
///
/// Pixels come straight out of the CPU rasterizer and are premultiplied; the flag makes that
/// explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame size.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> ThenNowResult<Vec<u8>> {
        let rgba = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba())
            .ok_or_else(|| ThenNowError::render("frame byte len mismatch"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    /// Encode as PNG and write to `path`.
    pub fn write_png(&self, path: &Path) -> ThenNowResult<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

/// Export file name for a timestamp in milliseconds since the Unix epoch.
pub fn export_file_name(timestamp_ms: i64) -> String {
    format!("then_and_now_{timestamp_ms}.png")
}

/// `dir` joined with [`export_file_name`].
pub fn export_path(dir: &Path, timestamp_ms: i64) -> PathBuf {
    dir.join(export_file_name(timestamp_ms))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
