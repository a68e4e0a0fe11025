//! Hollow contour band: a filled mask minus its erosion.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;

/// Subtract an eroded copy of `filled` from itself, leaving a band
/// roughly `iterations` pixels wide along the region's outline.
///
/// Repeating a 3x3 square erosion `iterations` times is the same as a
/// single erosion by an L-infinity ball of radius `iterations`, which
/// is what [`imageproc::morphology::erode`] computes.
#[must_use = "returns the hollow band mask"]
pub fn hollow_band(filled: &GrayImage, iterations: u8) -> GrayImage {
    let eroded = imageproc::morphology::erode(filled, Norm::LInf, iterations);
    GrayImage::from_fn(filled.width(), filled.height(), |x, y| {
        let a = filled.get_pixel(x, y).0[0];
        let b = eroded.get_pixel(x, y).0[0];
        Luma([a.saturating_sub(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: u32, lo: u32, hi: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn band_is_iterations_wide() {
        // Square spanning 5..35; after a radius-5 erosion 10..30 remains.
        let filled = square(40, 5, 35);
        let band = hollow_band(&filled, 5);
        assert_eq!(band, {
            let inner = square(40, 10, 30);
            GrayImage::from_fn(40, 40, |x, y| {
                Luma([filled.get_pixel(x, y).0[0] - inner.get_pixel(x, y).0[0]])
            })
        });
        assert_eq!(band.get_pixel(5, 20).0[0], 255);
        assert_eq!(band.get_pixel(9, 20).0[0], 255);
        assert_eq!(band.get_pixel(10, 20).0[0], 0);
        assert_eq!(band.get_pixel(4, 20).0[0], 0);
    }

    #[test]
    fn thin_region_erodes_away_entirely() {
        let filled = square(20, 8, 12);
        let band = hollow_band(&filled, 5);
        assert_eq!(band, filled);
    }

    #[test]
    fn empty_mask_stays_empty() {
        let filled = GrayImage::new(10, 10);
        assert_eq!(hollow_band(&filled, 5), filled);
    }
}
