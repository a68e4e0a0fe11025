//! Skeletonization: thin a binary band down to 1-pixel-wide lines.
//!
//! This module defines the [`Skeletonizer`] trait for pluggable
//! thinning algorithms and the [`SkeletonizerKind`] enum for selecting
//! one at runtime. [`SkeletonizerKind::Identity`] passes the band
//! through untouched; the line scorer still works on the wider band,
//! just with coarser line positions.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Selects which thinning algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonizerKind {
    /// Zhang-Suen parallel thinning.
    #[default]
    ZhangSuen,
    /// No thinning: the input mask is returned unchanged.
    Identity,
}

/// Trait for thinning strategies.
///
/// Input: a binary mask (non-zero = foreground).
/// Output: a mask of the same size with foreground 255.
pub trait Skeletonizer {
    /// Thin the foreground of `mask`.
    fn skeletonize(&self, mask: &GrayImage) -> GrayImage;
}

impl Skeletonizer for SkeletonizerKind {
    fn skeletonize(&self, mask: &GrayImage) -> GrayImage {
        match *self {
            Self::ZhangSuen => zhang_suen(mask),
            Self::Identity => mask.clone(),
        }
    }
}

/// Zhang-Suen thinning.
///
/// Alternates two sub-iterations until neither removes a pixel. With
/// the 8 neighbours of `p1` labelled clockwise from north
///
/// ```text
/// p9 p2 p3
/// p8 p1 p4
/// p7 p6 p5
/// ```
///
/// a foreground pixel is deleted when it has 2..=6 foreground
/// neighbours, exactly one 0->1 transition around the ring, and
/// `p2*p4*p6 == 0 && p4*p6*p8 == 0` (first pass) or
/// `p2*p4*p8 == 0 && p2*p6*p8 == 0` (second pass).
/// Pixels outside the image count as background.
#[must_use = "returns the thinned mask"]
pub fn zhang_suen(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let mut grid: Vec<bool> = mask.pixels().map(|p| p.0[0] != 0).collect();
    let mut doomed = Vec::new();

    loop {
        let mut changed = false;
        for pass in 0..2 {
            doomed.clear();
            for y in 0..hu {
                for x in 0..wu {
                    if grid[y * wu + x] && deletable(&grid, wu, hu, x, y, pass) {
                        doomed.push(y * wu + x);
                    }
                }
            }
            changed |= !doomed.is_empty();
            for &i in &doomed {
                grid[i] = false;
            }
        }
        if !changed {
            break;
        }
    }

    let mut out = GrayImage::new(w, h);
    for (i, pixel) in out.pixels_mut().enumerate() {
        if grid[i] {
            *pixel = Luma([255]);
        }
    }
    out
}

/// Neighbour ring `[p2, p3, .., p9]` of `(x, y)`.
fn neighbours(grid: &[bool], w: usize, h: usize, x: usize, y: usize) -> [bool; 8] {
    let at = |dx: isize, dy: isize| -> bool {
        let nx = x.checked_add_signed(dx);
        let ny = y.checked_add_signed(dy);
        match (nx, ny) {
            (Some(nx), Some(ny)) if nx < w && ny < h => grid[ny * w + nx],
            _ => false,
        }
    };
    [
        at(0, -1),
        at(1, -1),
        at(1, 0),
        at(1, 1),
        at(0, 1),
        at(-1, 1),
        at(-1, 0),
        at(-1, -1),
    ]
}

fn deletable(grid: &[bool], w: usize, h: usize, x: usize, y: usize, pass: u8) -> bool {
    let n = neighbours(grid, w, h, x, y);
    let [p2, _p3, p4, _p5, p6, _p7, p8, _p9] = n;

    let count = n.iter().filter(|&&v| v).count();
    if !(2..=6).contains(&count) {
        return false;
    }

    let transitions = (0..8).filter(|&i| !n[i] && n[(i + 1) % 8]).count();
    if transitions != 1 {
        return false;
    }

    if pass == 0 {
        !(p2 && p4 && p6) && !(p4 && p6 && p8)
    } else {
        !(p2 && p4 && p8) && !(p2 && p6 && p8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(w: u32, h: u32, y0: u32, y1: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if (2..w - 2).contains(&x) && (y0..y1).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn on_count(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] != 0).count()
    }

    #[test]
    fn default_is_zhang_suen() {
        assert_eq!(SkeletonizerKind::default(), SkeletonizerKind::ZhangSuen);
    }

    #[test]
    fn identity_passes_through() {
        let mask = band(20, 10, 3, 7);
        assert_eq!(SkeletonizerKind::Identity.skeletonize(&mask), mask);
    }

    #[test]
    fn empty_mask_stays_empty() {
        let mask = GrayImage::new(8, 8);
        assert_eq!(SkeletonizerKind::ZhangSuen.skeletonize(&mask), mask);
    }

    #[test]
    fn thick_bar_thins_to_single_row() {
        // A 5-pixel-tall horizontal bar collapses to a line one pixel
        // thick in its middle columns.
        let mask = band(40, 12, 3, 8);
        let skeleton = zhang_suen(&mask);
        for x in 10..30 {
            let column_on = (0..12)
                .filter(|&y| skeleton.get_pixel(x, y).0[0] != 0)
                .count();
            assert_eq!(column_on, 1, "column {x} should hold exactly one pixel");
        }
    }

    #[test]
    fn skeleton_is_subset_of_input() {
        let mask = band(30, 12, 2, 9);
        let skeleton = zhang_suen(&mask);
        for (x, y, p) in skeleton.enumerate_pixels() {
            if p.0[0] != 0 {
                assert_ne!(mask.get_pixel(x, y).0[0], 0);
            }
        }
        assert!(on_count(&skeleton) > 0);
        assert!(on_count(&skeleton) < on_count(&mask));
    }

    #[test]
    fn single_line_is_stable() {
        let mut mask = GrayImage::new(20, 5);
        for x in 3..17 {
            mask.put_pixel(x, 2, Luma([255]));
        }
        let skeleton = zhang_suen(&mask);
        // Only the line ends may be eroded; the middle survives.
        for x in 5..15 {
            assert_eq!(skeleton.get_pixel(x, 2).0[0], 255);
        }
    }

    #[test]
    fn thinning_is_idempotent() {
        let once = zhang_suen(&band(30, 14, 3, 10));
        let twice = zhang_suen(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&SkeletonizerKind::ZhangSuen).ok();
        assert_eq!(json.as_deref(), Some("\"zhang_suen\""));
    }
}
