//! External contour extraction and filling.
//!
//! Contours are traced with Suzuki-Abe border following via
//! [`imageproc::contours::find_contours`]; only outer borders are kept.
//! Because an outer border nested inside a hole is always enclosed by
//! (and so smaller than) its ancestor, the largest outer border is
//! always a top-level one.

use std::collections::BTreeSet;

use image::{GrayImage, Luma};
use imageproc::contours::BorderType;
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::types::BoundingRect;

/// A closed outer boundary traced from a binary mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalContour {
    points: Vec<(u32, u32)>,
    twice_area: u64,
}

impl ExternalContour {
    /// Build a contour from its boundary points, in tracing order.
    #[must_use]
    pub fn new(points: Vec<(u32, u32)>) -> Self {
        let twice_area = shoelace_twice_area(&points);
        Self { points, twice_area }
    }

    /// Boundary points `(x, y)` in tracing order.
    #[must_use]
    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    /// Enclosed polygon area (shoelace formula over the boundary points).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn area(&self) -> f64 {
        self.twice_area as f64 / 2.0
    }

    /// Axis-aligned bounding rectangle, or `None` for an empty contour.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        let (first, rest) = self.points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(BoundingRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }
}

/// Twice the absolute signed area of the closed polygon through `points`.
fn shoelace_twice_area(points: &[(u32, u32)]) -> u64 {
    if points.len() < 3 {
        return 0;
    }
    let signed: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(x0, y0), &(x1, y1))| {
            i64::from(x0) * i64::from(y1) - i64::from(x1) * i64::from(y0)
        })
        .sum();
    signed.unsigned_abs()
}

/// Trace all outer borders in a binary mask (non-zero = foreground).
#[must_use = "returns the traced contours"]
pub fn external_contours(mask: &GrayImage) -> Vec<ExternalContour> {
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(mask);

    contours
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && !c.points.is_empty())
        .map(|c| ExternalContour::new(c.points.into_iter().map(|p| (p.x, p.y)).collect()))
        .collect()
}

/// The outer contour with the largest enclosed area.
///
/// On equal areas the first traced contour wins. Returns `None` when
/// the mask has no foreground.
#[must_use]
pub fn largest_external_contour(mask: &GrayImage) -> Option<ExternalContour> {
    external_contours(mask)
        .into_iter()
        .reduce(|best, c| if c.twice_area > best.twice_area { c } else { best })
}

/// Rasterize the region enclosed by `contour` into a `width x height`
/// mask: 255 inside or on the boundary, 0 elsewhere. Holes inside the
/// boundary are filled.
///
/// The boundary is an 8-connected closed curve, so it separates the
/// 4-connected background into an exterior (every component touching
/// the image edge) and enclosed pockets.
#[must_use = "returns the filled mask"]
pub fn fill_contour(contour: &ExternalContour, width: u32, height: u32) -> GrayImage {
    let mut boundary = GrayImage::new(width, height);
    for &(x, y) in contour.points() {
        if x < width && y < height {
            boundary.put_pixel(x, y, Luma([255]));
        }
    }

    // Boundary pixels are the labelling background (label 0).
    let labels = connected_components(&boundary, Connectivity::Four, Luma([255u8]));
    let exterior = edge_labels(&labels);

    GrayImage::from_fn(width, height, |x, y| {
        let label = labels.get_pixel(x, y).0[0];
        if label == 0 || !exterior.contains(&label) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Non-zero labels of components that touch the image edge.
fn edge_labels(labels: &image::ImageBuffer<Luma<u32>, Vec<u32>>) -> BTreeSet<u32> {
    let (w, h) = labels.dimensions();
    let mut set = BTreeSet::new();
    if w == 0 || h == 0 {
        return set;
    }
    let top_bottom = (0..w).flat_map(|x| [(x, 0), (x, h - 1)]);
    let left_right = (0..h).flat_map(|y| [(0, y), (w - 1, y)]);
    for (x, y) in top_bottom.chain(left_right) {
        let label = labels.get_pixel(x, y).0[0];
        if label != 0 {
            set.insert(label);
        }
    }
    set
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rect_mask(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = GrayImage::new(10, 10);
        assert!(external_contours(&mask).is_empty());
        assert!(largest_external_contour(&mask).is_none());
    }

    #[test]
    fn filled_rectangle_bounds_and_area() {
        let mask = rect_mask(20, 20, 3, 4, 13, 10);
        let contour = largest_external_contour(&mask).unwrap();
        assert_eq!(
            contour.bounding_rect(),
            Some(BoundingRect {
                x: 3,
                y: 4,
                width: 10,
                height: 6,
            })
        );
        // Boundary polygon through pixel centres: 9 x 5.
        assert!((contour.area() - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn holes_are_not_external() {
        // A ring has one outer border and one hole border.
        let mut mask = rect_mask(20, 20, 2, 2, 18, 18);
        for y in 6..14 {
            for x in 6..14 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect().unwrap().width, 16);
    }

    #[test]
    fn largest_contour_is_selected() {
        let mut mask = rect_mask(40, 40, 2, 2, 6, 6);
        for y in 10..30 {
            for x in 10..35 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let largest = largest_external_contour(&mask).unwrap();
        assert_eq!(largest.bounding_rect().unwrap().x, 10);
    }

    #[test]
    fn single_point_contour() {
        let contour = ExternalContour::new(vec![(4, 7)]);
        assert!(contour.area().abs() < f64::EPSILON);
        assert_eq!(
            contour.bounding_rect(),
            Some(BoundingRect {
                x: 4,
                y: 7,
                width: 1,
                height: 1,
            })
        );
        assert_eq!(ExternalContour::new(vec![]).bounding_rect(), None);
    }

    #[test]
    fn fill_closes_ring_interior() {
        let mut mask = rect_mask(20, 20, 2, 2, 18, 18);
        for y in 5..15 {
            for x in 5..15 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let contour = largest_external_contour(&mask).unwrap();
        let filled = fill_contour(&contour, 20, 20);
        assert_eq!(filled, rect_mask(20, 20, 2, 2, 18, 18));
    }

    #[test]
    fn fill_ignores_other_components() {
        let mut mask = rect_mask(30, 30, 2, 2, 20, 20);
        mask.put_pixel(25, 25, Luma([255]));
        let contour = largest_external_contour(&mask).unwrap();
        let filled = fill_contour(&contour, 30, 30);
        assert_eq!(filled.get_pixel(25, 25).0[0], 0);
        assert_eq!(filled.get_pixel(10, 10).0[0], 255);
        assert_eq!(filled.get_pixel(1, 1).0[0], 0);
    }
}
