//! Padding and binarization of panel bitmaps.
//!
//! The panel is first surrounded by a constant white border so that no
//! foreground ever touches the image edge, then reduced to intensity
//! and thresholded with inverted semantics: anything darker than
//! near-white becomes foreground.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::{ThresholdType, threshold};

/// Surround `panel` with a `pad`-pixel constant white border.
#[must_use = "returns the padded image"]
pub fn pad_white(panel: &RgbImage, pad: u32) -> RgbImage {
    let mut padded = RgbImage::from_pixel(
        panel.width() + 2 * pad,
        panel.height() + 2 * pad,
        Rgb([255, 255, 255]),
    );
    image::imageops::replace(&mut padded, panel, i64::from(pad), i64::from(pad));
    padded
}

/// Convert to single-channel intensity using the BT.601 weights
/// `0.299 R + 0.587 G + 0.114 B`, rounded to nearest.
///
/// Fixed-point with 14 fractional bits; the weights sum to exactly
/// `1 << 14` so pure white maps to 255.
#[must_use = "returns the intensity image"]
pub fn intensity(image: &RgbImage) -> GrayImage {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const SHIFT: u32 = 14;

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let weighted = u32::from(r) * R + u32::from(g) * G + u32::from(b) * B;
        let value = (weighted + (1 << (SHIFT - 1))) >> SHIFT;
        Luma([u8::try_from(value).unwrap_or(u8::MAX)])
    })
}

/// Inverted binary threshold: pixels `<= level` become 255, the rest 0.
#[must_use = "returns the binary mask"]
pub fn threshold_inverted(gray: &GrayImage, level: u8) -> GrayImage {
    threshold(gray, level, ThresholdType::BinaryInverted)
}
