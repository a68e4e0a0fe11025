//! Error type for file-backed operations.

use std::path::PathBuf;

/// Errors raised while reading, writing or organizing panel files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// A file could not be read from disk.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// File contents are not a decodable image.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        /// Offending path.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// The image could not be encoded in the requested format.
    #[error("failed to encode image {}: {source}", path.display())]
    Encode {
        /// Destination path.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// The destination extension names no supported image format.
    #[error("unsupported output format for {}", path.display())]
    UnsupportedFormat {
        /// Destination path.
        path: PathBuf,
    },

    /// A file or directory could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The panel manifest is not valid JSON of the expected shape.
    #[error("invalid manifest {}: {source}", path.display())]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A batch finished without writing a single panel.
    #[error("no panels were written")]
    NoPanelsWritten,
}
