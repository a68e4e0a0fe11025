//! Border removal: crop a panel to the inside of its leftover frame.
//!
//! # Steps
//!
//! 1. Pad the panel with a white border ([`PAD`] pixels)
//! 2. Binarize: intensity `<=` [`THRESHOLD`] is foreground
//! 3. Trace outer contours; none means pass-through
//! 4. Keep the largest contour and its bounding rectangle
//! 5. Fill it, subtract its erosion to get a hollow band
//! 6. Thin the band to a skeleton (pluggable strategy)
//! 7. Restrict the skeleton to the bounding rectangle
//! 8. Score one frame line per side, scanning inside-out
//! 9. Combine into a crop rectangle pulled inward by the padding
//! 10. Reject inverted rectangles
//! 11. Crop (never outside the original panel area); reject results
//!     under [`MIN_OUTPUT_DIMENSION`]
//!
//! Every rejection returns the original panel untouched: the remover
//! has no error path.

use std::borrow::Cow;
use std::fmt;

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::binarize;
use crate::contour;
use crate::morphology;
use crate::scan::{self, Side};
use crate::skeleton::Skeletonizer;
use crate::types::{BorderConfig, BorderLines, BoundingRect, CropRect};

/// Panels narrower or shorter than this are returned unchanged.
pub const MIN_PANEL_DIMENSION: u32 = 30;

/// White border added around the panel before contour tracing.
pub const PAD: u32 = 15;

/// Highest intensity still treated as foreground.
pub const THRESHOLD: u8 = 240;

/// Radius of the erosion used to hollow out the filled contour.
pub const EROSION_ITERATIONS: u8 = 5;

/// Crops narrower or shorter than this are discarded.
pub const MIN_OUTPUT_DIMENSION: u32 = 10;

/// Why a panel was returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Passthrough {
    /// A dimension is below [`MIN_PANEL_DIMENSION`].
    TooSmall,
    /// The binarized panel has no foreground contour.
    NoContour,
    /// The scanned lines produced an empty or inverted rectangle.
    DegenerateCrop,
    /// The crop is below [`MIN_OUTPUT_DIMENSION`] in some dimension.
    OverTrimmed,
}

impl fmt::Display for Passthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall => f.write_str("panel too small"),
            Self::NoContour => f.write_str("no contour found"),
            Self::DegenerateCrop => f.write_str("degenerate crop rectangle"),
            Self::OverTrimmed => f.write_str("crop too small"),
        }
    }
}

/// Result of a border-removal attempt.
#[derive(Debug, Clone)]
pub enum TrimOutcome {
    /// The frame was found and cropped away.
    Trimmed {
        /// The cropped panel.
        image: RgbImage,
        /// Crop rectangle in padded-image coordinates.
        crop: CropRect,
        /// The frame lines picked by the scorer.
        lines: BorderLines,
    },
    /// A guard fired; the caller should keep the original panel.
    Unchanged(Passthrough),
}

impl TrimOutcome {
    /// Returns `true` when a crop was produced.
    #[must_use]
    pub const fn is_trimmed(&self) -> bool {
        matches!(self, Self::Trimmed { .. })
    }

    /// The guard that fired, if any.
    #[must_use]
    pub const fn passthrough(&self) -> Option<Passthrough> {
        match self {
            Self::Trimmed { .. } => None,
            Self::Unchanged(reason) => Some(*reason),
        }
    }

    /// Resolve to an image, borrowing `original` on pass-through.
    #[must_use]
    pub fn into_image(self, original: &RgbImage) -> Cow<'_, RgbImage> {
        match self {
            Self::Trimmed { image, .. } => Cow::Owned(image),
            Self::Unchanged(_) => Cow::Borrowed(original),
        }
    }
}

/// Every intermediate raster of one border-removal run.
///
/// Stages that were never reached (because an earlier guard fired)
/// are `None`.
#[derive(Debug, Clone)]
pub struct StagedTrim {
    /// Step 1: the white-padded panel.
    pub padded: Option<RgbImage>,
    /// Step 2: inverted binary threshold of the padded panel.
    pub binary: Option<GrayImage>,
    /// Step 4: bounding rectangle of the largest contour.
    pub bounding: Option<BoundingRect>,
    /// Step 5: the largest contour, filled.
    pub filled: Option<GrayImage>,
    /// Step 5: filled mask minus its erosion.
    pub hollow: Option<GrayImage>,
    /// Step 6: the thinned band.
    pub skeleton: Option<GrayImage>,
    /// Final result.
    pub outcome: TrimOutcome,
}

impl StagedTrim {
    const fn unchanged(reason: Passthrough) -> Self {
        Self {
            padded: None,
            binary: None,
            bounding: None,
            filled: None,
            hollow: None,
            skeleton: None,
            outcome: TrimOutcome::Unchanged(reason),
        }
    }
}

/// Remove the leftover frame from `panel`.
///
/// Returns the cropped panel, or `panel` itself (borrowed, bit-identical)
/// when any guard fires. Never fails.
#[must_use]
pub fn remove_border<'a>(panel: &'a RgbImage, config: &BorderConfig) -> Cow<'a, RgbImage> {
    trim(panel, config).into_image(panel)
}

/// Run border removal with the skeletonizer selected in `config`.
#[must_use]
pub fn trim(panel: &RgbImage, config: &BorderConfig) -> TrimOutcome {
    trim_with(panel, config, &config.skeletonizer)
}

/// Run border removal with an injected skeletonizer.
///
/// `config.skeletonizer` is ignored in favour of `skeletonizer`.
#[must_use]
pub fn trim_with<S: Skeletonizer + ?Sized>(
    panel: &RgbImage,
    config: &BorderConfig,
    skeletonizer: &S,
) -> TrimOutcome {
    trim_staged_with(panel, config, skeletonizer).outcome
}

/// Like [`trim`], but keeps every intermediate raster.
#[must_use]
pub fn trim_staged(panel: &RgbImage, config: &BorderConfig) -> StagedTrim {
    trim_staged_with(panel, config, &config.skeletonizer)
}

/// Like [`trim_with`], but keeps every intermediate raster.
#[must_use]
pub fn trim_staged_with<S: Skeletonizer + ?Sized>(
    panel: &RgbImage,
    config: &BorderConfig,
    skeletonizer: &S,
) -> StagedTrim {
    let (width, height) = panel.dimensions();
    if width < MIN_PANEL_DIMENSION || height < MIN_PANEL_DIMENSION {
        log::debug!("skipping {width}x{height} panel: below {MIN_PANEL_DIMENSION}px");
        return StagedTrim::unchanged(Passthrough::TooSmall);
    }

    let padded = binarize::pad_white(panel, PAD);
    let binary = binarize::threshold_inverted(&binarize::intensity(&padded), THRESHOLD);

    let Some(largest) = contour::largest_external_contour(&binary) else {
        log::debug!("no contour in {width}x{height} panel");
        return StagedTrim {
            padded: Some(padded),
            binary: Some(binary),
            ..StagedTrim::unchanged(Passthrough::NoContour)
        };
    };
    log::trace!("largest contour area {}", largest.area());
    let Some(bounding) = largest.bounding_rect() else {
        return StagedTrim {
            padded: Some(padded),
            binary: Some(binary),
            ..StagedTrim::unchanged(Passthrough::NoContour)
        };
    };

    let filled = contour::fill_contour(&largest, padded.width(), padded.height());
    let hollow = morphology::hollow_band(&filled, EROSION_ITERATIONS);
    let skeleton = skeletonizer.skeletonize(&hollow);

    let roi = image::imageops::crop_imm(
        &skeleton,
        bounding.x,
        bounding.y,
        bounding.width,
        bounding.height,
    )
    .to_image();
    let lines = scan_lines(&roi, config.search_zone_ratio);
    log::trace!("frame lines {lines:?} within {bounding:?}");

    let outcome = crop_to_lines(&padded, bounding, lines, config.inward_padding);
    if let Some(reason) = outcome.passthrough() {
        log::debug!("keeping {width}x{height} panel unchanged: {reason}");
    }

    StagedTrim {
        padded: Some(padded),
        binary: Some(binary),
        bounding: Some(bounding),
        filled: Some(filled),
        hollow: Some(hollow),
        skeleton: Some(skeleton),
        outcome,
    }
}

/// Score one frame line per side of the region of interest.
fn scan_lines(roi: &GrayImage, search_zone_ratio: f64) -> BorderLines {
    let (w, h) = roi.dimensions();
    let [top, bottom, left, right] = Side::ALL.map(|side| {
        let range = side.scan_range(w, h, search_zone_ratio);
        scan::find_best_border_line(roi, side.axis(), range)
    });
    BorderLines {
        top,
        bottom,
        left,
        right,
    }
}

/// Steps 9 to 11: build, validate and apply the crop rectangle.
fn crop_to_lines(
    padded: &RgbImage,
    bounding: BoundingRect,
    lines: BorderLines,
    inward_padding: u32,
) -> TrimOutcome {
    let x = i64::from(bounding.x);
    let y = i64::from(bounding.y);
    let pad = i64::from(inward_padding);
    let crop = CropRect {
        x1: x + lines.left + pad,
        y1: y + lines.top + pad,
        x2: x + lines.right - pad,
        y2: y + lines.bottom - pad,
    };

    if !crop.is_valid() {
        return TrimOutcome::Unchanged(Passthrough::DegenerateCrop);
    }

    // Lines lie inside the bounding rectangle, so a valid crop is inside
    // the padded image.
    let (Ok(x1), Ok(y1), Ok(crop_w), Ok(crop_h)) = (
        u32::try_from(crop.x1),
        u32::try_from(crop.y1),
        u32::try_from(crop.width()),
        u32::try_from(crop.height()),
    ) else {
        return TrimOutcome::Unchanged(Passthrough::DegenerateCrop);
    };

    if crop_w < MIN_OUTPUT_DIMENSION || crop_h < MIN_OUTPUT_DIMENSION {
        return TrimOutcome::Unchanged(Passthrough::OverTrimmed);
    }

    let image = image::imageops::crop_imm(padded, x1, y1, crop_w, crop_h).to_image();
    TrimOutcome::Trimmed { image, crop, lines }
}
