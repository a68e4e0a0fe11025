//! Line scoring: pick the row or column most likely to be a frame line.
//!
//! A panel's leftover frame is a long, nearly unbroken line in the
//! skeleton mask. For each side of the panel we walk a [`ScanRange`]
//! from the interior toward the edge, score every candidate line by
//! its "on" pixel count, and weight that count by how far out the
//! candidate lies:
//!
//! ```text
//! score(i) = count(i) * (1 + |i - start| / |stop - start|)
//! ```
//!
//! The running maximum is updated with `>=`, so on an exact tie the
//! later (more exterior) candidate wins.

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Which axis a scan varies along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Candidates are columns (selector `0`); used for left/right borders.
    Columns,
    /// Candidates are rows (selector `1`); used for top/bottom borders.
    Rows,
}

impl Axis {
    /// Map the numeric axis selector (`0` = columns, `1` = rows).
    #[must_use]
    pub const fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            0 => Some(Self::Columns),
            1 => Some(Self::Rows),
            _ => None,
        }
    }

}

/// A half-open run of candidate indices with a direction.
///
/// Ascending ranges visit `start, start + 1, ..` while `< stop`;
/// descending ranges visit `start, start - 1, ..` while `> stop`.
/// `stop` is never visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    /// First candidate visited.
    pub start: i64,
    /// Exclusive bound.
    pub stop: i64,
    /// `1` for ascending, `-1` for descending.
    pub step: i64,
}

impl ScanRange {
    /// Indices `start, start + 1, .., stop - 1`.
    #[must_use]
    pub const fn ascending(start: i64, stop: i64) -> Self {
        Self {
            start,
            stop,
            step: 1,
        }
    }

    /// Indices `from, from - 1, .., to_exclusive + 1`.
    #[must_use]
    pub const fn descending(from: i64, to_exclusive: i64) -> Self {
        Self {
            start: from,
            stop: to_exclusive,
            step: -1,
        }
    }

    /// Distance between `start` and `stop`, the denominator of the
    /// position weight.
    #[must_use]
    pub const fn span(&self) -> u64 {
        self.stop.abs_diff(self.start)
    }

    /// Iterate over the candidate indices in visiting order.
    #[must_use]
    pub const fn iter(&self) -> ScanIter {
        ScanIter {
            next: self.start,
            range: *self,
        }
    }
}

impl IntoIterator for ScanRange {
    type Item = i64;
    type IntoIter = ScanIter;

    fn into_iter(self) -> ScanIter {
        self.iter()
    }
}

/// Iterator over a [`ScanRange`].
#[derive(Debug, Clone)]
pub struct ScanIter {
    next: i64,
    range: ScanRange,
}

impl Iterator for ScanIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let in_range = if self.range.step > 0 {
            self.next < self.range.stop
        } else {
            self.next > self.range.stop
        };
        if !in_range || self.range.step == 0 {
            return None;
        }
        let current = self.next;
        self.next += self.range.step;
        Some(current)
    }
}

/// One side of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Upper frame line.
    Top,
    /// Lower frame line.
    Bottom,
    /// Left frame line.
    Left,
    /// Right frame line.
    Right,
}

impl Side {
    /// All sides, in scan order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// The axis the candidates for this side vary along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Rows,
            Self::Left | Self::Right => Axis::Columns,
        }
    }

    /// Build the inside-out scan range for this side of a
    /// `width x height` region.
    ///
    /// The search zone depth is `floor(dim * search_zone_ratio)`, bounded
    /// to `0..=dim`. Top and left scan from the zone boundary down to
    /// index 0 inclusive; bottom and right scan from `dim - depth` up to
    /// `dim` exclusive.
    #[must_use]
    pub fn scan_range(self, width: u32, height: u32, search_zone_ratio: f64) -> ScanRange {
        let dim = match self.axis() {
            Axis::Rows => i64::from(height),
            Axis::Columns => i64::from(width),
        };
        let depth = zone_depth(dim, search_zone_ratio);
        match self {
            Self::Top | Self::Left => ScanRange::descending(depth, -1),
            Self::Bottom | Self::Right => ScanRange::ascending(dim - depth, dim),
        }
    }
}

/// `dim * ratio` truncated toward zero and bounded to `0..=dim`.
///
/// NaN maps to 0.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn zone_depth(dim: i64, ratio: f64) -> i64 {
    ((dim as f64 * ratio) as i64).clamp(0, dim)
}

/// Count the "on" (non-zero) pixels along one full row or column.
///
/// Indices outside the mask count as empty lines.
#[must_use]
pub fn count_line(mask: &GrayImage, axis: Axis, index: i64) -> u32 {
    let Ok(index) = u32::try_from(index) else {
        return 0;
    };
    let count = match axis {
        Axis::Rows => {
            if index >= mask.height() {
                return 0;
            }
            (0..mask.width())
                .filter(|&x| mask.get_pixel(x, index).0[0] != 0)
                .count()
        }
        Axis::Columns => {
            if index >= mask.width() {
                return 0;
            }
            (0..mask.height())
                .filter(|&y| mask.get_pixel(index, y).0[0] != 0)
                .count()
        }
    };
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Find the index of the best frame-line candidate in `range`.
///
/// Returns `range.start` immediately for a zero-span range. Otherwise
/// every candidate is scored and the maximum kept with a `>=`
/// comparison, so the most exterior of several equally scored
/// candidates wins. The function is pure: the same mask and range
/// always yield the same index.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn find_best_border_line(mask: &GrayImage, axis: Axis, range: ScanRange) -> i64 {
    let mut best_index = range.start;
    let total_span = range.span();
    if total_span == 0 {
        return best_index;
    }

    let mut max_score = -1.0_f64;
    for i in range {
        let continuity = f64::from(count_line(mask, axis, i));
        let progress = i.abs_diff(range.start);
        let position_weight = progress as f64 / total_span as f64;
        let score = continuity * (1.0 + position_weight);

        if score >= max_score {
            max_score = score;
            best_index = i;
        }
    }

    best_index
}
