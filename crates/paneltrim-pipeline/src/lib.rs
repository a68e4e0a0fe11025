//! paneltrim-pipeline: Pure border-removal pipeline (sans-IO).
//!
//! Crops a comic/manga panel bitmap to the inside of the frame line
//! left over from the page's panel grid:
//! pad -> binarize -> outer contour -> fill -> hollow band ->
//! skeleton -> inside-out line scoring -> crop.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images. File reading, manifest parsing and batch orchestration
//! live in `paneltrim-io`.
//!
//! Every call allocates its own intermediates and touches no shared
//! state, so panels can be processed concurrently without locking.

pub mod binarize;
pub mod border;
pub mod contour;
pub mod morphology;
pub mod scan;
pub mod skeleton;
pub mod types;

pub use border::{
    Passthrough, StagedTrim, TrimOutcome, remove_border, trim, trim_staged, trim_staged_with,
    trim_with,
};
pub use scan::{Axis, ScanRange, Side, find_best_border_line};
pub use skeleton::{Skeletonizer, SkeletonizerKind};
pub use types::{BorderConfig, BorderLines, BoundingRect, ConfigError, CropRect, GrayImage, RgbImage};
