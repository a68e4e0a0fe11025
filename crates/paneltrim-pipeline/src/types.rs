//! Shared types for the paneltrim border-removal pipeline.

use serde::{Deserialize, Serialize};

use crate::skeleton::SkeletonizerKind;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference panel
/// bitmaps without depending on `image` directly.
pub use image::RgbImage;

/// Axis-aligned box enclosing a contour, in the coordinate space of
/// the mask the contour was traced from.
///
/// The extent is inclusive of both end pixels: a contour made of one
/// point has `width == height == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Final crop boundaries in padded-image coordinates.
///
/// `x2` and `y2` are exclusive. A rectangle is only usable when
/// `x1 < x2` and `y1 < y2`; see [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge (inclusive).
    pub x1: i64,
    /// Top edge (inclusive).
    pub y1: i64,
    /// Right edge (exclusive).
    pub x2: i64,
    /// Bottom edge (exclusive).
    pub y2: i64,
}

impl CropRect {
    /// Returns `true` when the rectangle is non-empty and not inverted.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Horizontal extent (`x2 - x1`), negative for inverted rectangles.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    /// Vertical extent (`y2 - y1`), negative for inverted rectangles.
    #[must_use]
    pub const fn height(&self) -> i64 {
        self.y2 - self.y1
    }
}

/// The four border-line indices picked by the line scorer, expressed
/// in the coordinates of the bounding-rectangle region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderLines {
    /// Row of the top frame line.
    pub top: i64,
    /// Row of the bottom frame line.
    pub bottom: i64,
    /// Column of the left frame line.
    pub left: i64,
    /// Column of the right frame line.
    pub right: i64,
}

/// Tunables for border removal.
///
/// # Invariants
///
/// `search_zone_ratio` must be finite and within `[0, 1)`. The remover
/// itself accepts any value, bounding the search depth to the region
/// (NaN counts as 0), but [`validate`](Self::validate) rejects values
/// that cannot describe a search zone so front ends can report them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// How deep into the panel, as a fraction of each dimension, the
    /// scan looks for a frame line.
    pub search_zone_ratio: f64,

    /// Pixels trimmed inward from each detected frame line.
    pub inward_padding: u32,

    /// Thinning strategy applied to the hollow contour band.
    pub skeletonizer: SkeletonizerKind,
}

impl BorderConfig {
    /// Default search zone ratio.
    pub const DEFAULT_SEARCH_ZONE_RATIO: f64 = 0.25;

    /// Default inward padding in pixels.
    pub const DEFAULT_INWARD_PADDING: u32 = 5;

    /// Check the invariants documented on the type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SearchZoneRatio`] if the ratio is not
    /// finite or lies outside `[0, 1)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.search_zone_ratio;
        if !ratio.is_finite() || !(0.0..1.0).contains(&ratio) {
            return Err(ConfigError::SearchZoneRatio(ratio));
        }
        Ok(())
    }
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            search_zone_ratio: Self::DEFAULT_SEARCH_ZONE_RATIO,
            inward_padding: Self::DEFAULT_INWARD_PADDING,
            skeletonizer: SkeletonizerKind::default(),
        }
    }
}

/// Errors raised when validating a [`BorderConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The search zone ratio cannot describe a search zone.
    #[error("search zone ratio must be finite and within [0, 1), got {0}")]
    SearchZoneRatio(f64),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crop_rect_validity() {
        let ok = CropRect {
            x1: 2,
            y1: 3,
            x2: 10,
            y2: 4,
        };
        assert!(ok.is_valid());
        assert_eq!(ok.width(), 8);
        assert_eq!(ok.height(), 1);

        let flat = CropRect { y2: 3, ..ok };
        assert!(!flat.is_valid());

        let inverted = CropRect {
            x1: 10,
            x2: 2,
            ..ok
        };
        assert!(!inverted.is_valid());
        assert_eq!(inverted.width(), -8);
    }

    #[test]
    fn border_config_defaults() {
        let config = BorderConfig::default();
        assert!((config.search_zone_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.inward_padding, 5);
        assert_eq!(config.skeletonizer, SkeletonizerKind::ZhangSuen);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_ratios() {
        for ratio in [-0.1, 1.0, 3.0, f64::NAN, f64::INFINITY] {
            let config = BorderConfig {
                search_zone_ratio: ratio,
                ..BorderConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::SearchZoneRatio(_))),
                "ratio {ratio} should be rejected",
            );
        }
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::SearchZoneRatio(1.5);
        assert_eq!(
            err.to_string(),
            "search zone ratio must be finite and within [0, 1), got 1.5",
        );
    }

    #[test]
    fn border_config_partial_json_uses_defaults() {
        let config: BorderConfig = serde_json::from_str(r#"{"inward_padding": 8}"#).unwrap();
        assert_eq!(config.inward_padding, 8);
        assert!((config.search_zone_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.skeletonizer, SkeletonizerKind::ZhangSuen);
    }

    #[test]
    fn skeletonizer_kind_json_names() {
        let config = BorderConfig {
            skeletonizer: SkeletonizerKind::Identity,
            ..BorderConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""skeletonizer":"identity""#), "got {json}");
    }
}
