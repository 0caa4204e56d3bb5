use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context as _;

use crate::assets::decode::{DecodedImage, from_rgba};
use crate::foundation::error::{ThenNowError, ThenNowResult};

/// User-facing message when HEIF/HEIC input cannot be converted.
pub const HEIF_CONVERSION_FAILED: &str = "Failed to convert HEIF image. Please try converting to \
     JPEG manually or change your iPhone camera settings to \"Most Compatible\".";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One user-selected file, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    /// Original file name (used for HEIF detection by extension).
    pub file_name: String,
    /// Declared MIME type.
    pub mime: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Build an upload from parts.
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension.
    pub fn from_path(path: &Path) -> ThenNowResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read upload '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_for_file_name(&file_name);
        Ok(Self::new(file_name, mime, bytes))
    }

    /// Size in binary megabytes.
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / BYTES_PER_MB
    }

    /// HEIF/HEIC by declared type or by extension.
    pub fn is_heif(&self) -> bool {
        let name = self.file_name.to_ascii_lowercase();
        self.mime == "image/heif"
            || self.mime == "image/heic"
            || name.ends_with(".heic")
            || name.ends_with(".heif")
    }
}

/// MIME type a browser would declare for a file name.
pub fn mime_for_file_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Accepted stored formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImageMime {
    /// `image/jpeg` (also declared as `image/jpg`).
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// `image/png`.
    #[serde(rename = "image/png")]
    Png,
    /// `image/webp`.
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageMime {
    /// Parse a declared MIME type; `None` when unsupported.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical MIME string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host device class; selects the upload limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Phones and tablets.
    Mobile,
    /// Everything else.
    #[default]
    Desktop,
}

impl DeviceClass {
    /// Size limits for this class.
    pub fn limits(self) -> UploadLimits {
        match self {
            Self::Mobile => UploadLimits {
                max_file_mb: 10,
                max_width: 1920,
                max_height: 1920,
                jpeg_quality: 80,
            },
            Self::Desktop => UploadLimits {
                max_file_mb: 15,
                max_width: 3840,
                max_height: 3840,
                jpeg_quality: 90,
            },
        }
    }
}

impl FromStr for DeviceClass {
    type Err = ThenNowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            other => Err(ThenNowError::validation(format!(
                "unknown device class '{other}' (expected mobile|desktop)"
            ))),
        }
    }
}

/// Upload limits for one device class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum accepted file size in binary megabytes.
    pub max_file_mb: u32,
    /// Stored images wider than this are downscaled.
    pub max_width: u32,
    /// Stored images taller than this are downscaled.
    pub max_height: u32,
    /// JPEG re-encode quality, 1..=100.
    pub jpeg_quality: u8,
}

/// Outcome of [`FileValidator::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    /// Whether the file may proceed.
    pub valid: bool,
    /// Human-readable reason when rejected.
    pub error: Option<String>,
}

impl Validation {
    /// Accept.
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// Reject with a message.
    pub fn reject(msg: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(msg.into()),
        }
    }
}

/// Pre-decode gate for uploads.
pub trait FileValidator {
    /// Inspect type and size without decoding.
    fn validate(&self, upload: &Upload) -> Validation;
}

/// Type/size validator driven by [`UploadLimits`].
#[derive(Clone, Copy, Debug)]
pub struct LimitsValidator {
    limits: UploadLimits,
}

impl LimitsValidator {
    /// Validator for the given limits.
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }
}

impl FileValidator for LimitsValidator {
    fn validate(&self, upload: &Upload) -> Validation {
        if !upload.mime.starts_with("image/") {
            return Validation::reject("Please select an image file");
        }
        if ImageMime::from_mime(&upload.mime).is_none() {
            return Validation::reject(format!(
                "Unsupported format: {}. Supported formats: JPEG, PNG, WebP",
                upload.mime
            ));
        }
        let size_mb = upload.size_mb();
        if size_mb > f64::from(self.limits.max_file_mb) {
            return Validation::reject(format!(
                "Image too large ({size_mb:.1}MB). Maximum size: {}MB",
                self.limits.max_file_mb
            ));
        }
        Validation::ok()
    }
}

/// HEIF/HEIC to raster conversion, supplied by the host.
pub trait HeifConverter {
    /// Convert to a supported format; the returned upload is validated afterwards.
    fn convert(&self, upload: Upload) -> ThenNowResult<Upload>;
}

/// Converter used when no HEIF codec is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHeifCodec;

impl HeifConverter for NoHeifCodec {
    fn convert(&self, upload: Upload) -> ThenNowResult<Upload> {
        tracing::warn!(file = %upload.file_name, "no HEIF codec available");
        Err(ThenNowError::decode(HEIF_CONVERSION_FAILED))
    }
}

/// An upload that passed validation, decoded and size-normalized.
#[derive(Clone, Debug)]
pub struct PreparedUpload {
    /// Format of `bytes`.
    pub mime: ImageMime,
    /// Encoded bytes to persist.
    pub bytes: Vec<u8>,
    /// Decoded raster of `bytes`.
    pub image: DecodedImage,
    /// Whether the image was downscaled and re-encoded.
    pub optimized: bool,
}

/// Convert, validate, decode and downscale uploads.
pub struct IngestPipeline {
    limits: UploadLimits,
    validator: Box<dyn FileValidator>,
    heif: Box<dyn HeifConverter>,
}

impl fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestPipeline")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl IngestPipeline {
    /// Pipeline with the default validator and no HEIF codec.
    pub fn new(device: DeviceClass) -> Self {
        let limits = device.limits();
        Self {
            limits,
            validator: Box::new(LimitsValidator::new(limits)),
            heif: Box::new(NoHeifCodec),
        }
    }

    /// Replace the validator.
    pub fn with_validator(mut self, validator: impl FileValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the HEIF converter.
    pub fn with_heif_converter(mut self, heif: impl HeifConverter + 'static) -> Self {
        self.heif = Box::new(heif);
        self
    }

    /// Active limits.
    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Run an upload through conversion, validation, decode and downscale.
    ///
    /// Nothing here touches slot state; any error leaves the caller's slot as it was.
    pub fn prepare(&self, upload: Upload) -> ThenNowResult<PreparedUpload> {
        let upload = if upload.is_heif() {
            self.heif.convert(upload)?
        } else {
            upload
        };

        let verdict = self.validator.validate(&upload);
        if !verdict.valid {
            return Err(ThenNowError::validation(
                verdict
                    .error
                    .unwrap_or_else(|| "Invalid image file".to_string()),
            ));
        }
        let mime = ImageMime::from_mime(&upload.mime).ok_or_else(|| {
            ThenNowError::validation(format!(
                "Unsupported format: {}. Supported formats: JPEG, PNG, WebP",
                upload.mime
            ))
        })?;

        let decoded = image::load_from_memory(&upload.bytes).map_err(|e| {
            ThenNowError::decode(format!(
                "Failed to read image file. The file may be corrupted. ({e})"
            ))
        })?;

        let (w, h) = (decoded.width(), decoded.height());
        if w <= self.limits.max_width && h <= self.limits.max_height {
            let image = from_rgba(decoded.to_rgba8())?;
            tracing::debug!(file = %upload.file_name, w, h, %mime, "upload accepted as-is");
            return Ok(PreparedUpload {
                mime,
                bytes: upload.bytes,
                image,
                optimized: false,
            });
        }

        let resized = decoded.resize(
            self.limits.max_width,
            self.limits.max_height,
            image::imageops::FilterType::Triangle,
        );
        let (mime, bytes) = self.reencode(&resized, mime)?;
        tracing::debug!(
            file = %upload.file_name,
            from_w = w,
            from_h = h,
            to_w = resized.width(),
            to_h = resized.height(),
            %mime,
            "upload downscaled"
        );
        Ok(PreparedUpload {
            mime,
            bytes,
            image: from_rgba(resized.to_rgba8())?,
            optimized: true,
        })
    }

    fn reencode(
        &self,
        img: &image::DynamicImage,
        mime: ImageMime,
    ) -> ThenNowResult<(ImageMime, Vec<u8>)> {
        let mut buf = Vec::new();
        match mime {
            ImageMime::Jpeg => {
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buf,
                    self.limits.jpeg_quality,
                );
                image::DynamicImage::ImageRgb8(img.to_rgb8())
                    .write_with_encoder(encoder)
                    .context("re-encode jpeg")?;
                Ok((ImageMime::Jpeg, buf))
            }
            ImageMime::Png | ImageMime::Webp => {
                img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                    .context("re-encode png")?;
                Ok((ImageMime::Png, buf))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/ingest.rs"]
mod tests;
