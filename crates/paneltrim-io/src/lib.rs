//! paneltrim-io: File-backed panel extraction around the pure pipeline.
//!
//! Reads page and panel images through a pluggable [`ImageCodec`],
//! parses page manifests produced by a panel segmenter, names output
//! files according to an [`OutputLayout`], and drives border removal
//! over whole batches in parallel.

pub mod batch;
pub mod codec;
pub mod error;
pub mod layout;
pub mod manifest;

pub use batch::{BatchOptions, BatchSummary, process_pages, process_panels};
pub use codec::{FsCodec, ImageCodec};
pub use error::IoError;
pub use layout::OutputLayout;
pub use manifest::{PageEntry, PanelRect, crop_panel, load_manifest, parse_manifest};
