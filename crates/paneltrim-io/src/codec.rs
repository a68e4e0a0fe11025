//! Pluggable image reading and writing.
//!
//! Components that need file-backed images take an [`ImageCodec`]
//! rather than calling the `image` crate's path helpers directly, so
//! tests and embedders can swap in their own storage. [`FsCodec`] is
//! the filesystem implementation: it reads raw bytes with `std::fs`
//! and decodes in memory, which works for any path the OS accepts.

use std::io::Cursor;
use std::path::Path;

use image::{ImageEncoder, ImageFormat, RgbImage};

use crate::error::IoError;

/// Read and write panel images by path.
pub trait ImageCodec {
    /// Load the image at `path` as 8-bit RGB.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if the file cannot be read or decoded.
    fn read(&self, path: &Path) -> Result<RgbImage, IoError>;

    /// Store `image` at `path`, choosing the format from the extension.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if encoding or writing fails.
    fn write(&self, path: &Path, image: &RgbImage) -> Result<(), IoError>;
}

/// Filesystem-backed codec.
///
/// Paths without an extension are written as JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsCodec {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl FsCodec {
    /// Default JPEG quality.
    pub const DEFAULT_JPEG_QUALITY: u8 = 95;

    /// Codec with the given JPEG quality, clamped to 1..=100.
    #[must_use]
    pub fn with_jpeg_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: quality.clamp(1, 100),
        }
    }

    /// Encode `image` into memory in the format implied by `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] for unknown extensions and
    /// [`IoError::Encode`] if the encoder rejects the image.
    pub fn encode(&self, path: &Path, image: &RgbImage) -> Result<Vec<u8>, IoError> {
        let format = match path.extension() {
            None => ImageFormat::Jpeg,
            Some(ext) => ImageFormat::from_extension(ext).ok_or_else(|| {
                IoError::UnsupportedFormat {
                    path: path.to_path_buf(),
                }
            })?,
        };

        let mut buf = Vec::new();
        let encoded = if format == ImageFormat::Jpeg {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
            encoder.write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
        } else {
            image.write_to(&mut Cursor::new(&mut buf), format)
        };
        encoded.map_err(|source| IoError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(buf)
    }
}

impl Default for FsCodec {
    fn default() -> Self {
        Self {
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageCodec for FsCodec {
    fn read(&self, path: &Path) -> Result<RgbImage, IoError> {
        let bytes = std::fs::read(path).map_err(|source| IoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| IoError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(decoded.to_rgb8())
    }

    fn write(&self, path: &Path, image: &RgbImage) -> Result<(), IoError> {
        let bytes = self.encode(path, image)?;
        std::fs::write(path, bytes).map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
