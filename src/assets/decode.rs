use std::sync::Arc;

use crate::foundation::core::Size;
use crate::foundation::error::{ThenNowError, ThenNowResult};

/// Decoded raster ready to be sampled by the compositor.
///
/// Pixels are held as a premultiplied `vello_cpu` pixmap behind an `Arc`, so cloning is cheap and
/// every render of the same content shares one allocation.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl DecodedImage {
    /// Pixel dimensions as a float size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(self.pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// Decode encoded image bytes (JPEG, PNG, WebP) into a premultiplied raster.
pub fn decode_image(bytes: &[u8]) -> ThenNowResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| {
        ThenNowError::decode(format!(
            "Failed to read image file. The file may be corrupted. ({e})"
        ))
    })?;
    from_rgba(dyn_img.to_rgba8())
}

/// Wrap an already-decoded straight-alpha buffer.
pub fn from_rgba(rgba: image::RgbaImage) -> ThenNowResult<DecodedImage> {
    let (width, height) = rgba.dimensions();
    let mut bytes = rgba.into_raw();
    premultiply_rgba8_in_place(&mut bytes);
    let pixmap = pixmap_from_premul_bytes(&bytes, width, height)?;
    Ok(DecodedImage {
        width,
        height,
        pixmap: Arc::new(pixmap),
    })
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ThenNowResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ThenNowError::decode("image width exceeds 65535 px"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ThenNowError::decode("image height exceeds 65535 px"))?;
    if w == 0 || h == 0 {
        return Err(ThenNowError::decode("image has zero width or height"));
    }
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ThenNowError::decode("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 0xff);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
