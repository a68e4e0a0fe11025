//! Page manifests: which panels to cut out of which page.
//!
//! Panel rectangles come from an external page-segmentation stage
//! that emits Kumiko-style JSON:
//!
//! ```json
//! [
//!   { "filename": "p001.jpg", "size": [1200, 1800],
//!     "panels": [[20, 30, 560, 800], [600, 30, 560, 800]] }
//! ]
//! ```
//!
//! `size` is optional and any other key is ignored.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::IoError;

/// One panel rectangle in page pixel coordinates.
///
/// Serialized as the Kumiko `[x, y, width, height]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct PanelRect {
    /// Left column.
    pub x: i64,
    /// Top row.
    pub y: i64,
    /// Width in pixels.
    pub width: i64,
    /// Height in pixels.
    pub height: i64,
}

impl From<[i64; 4]> for PanelRect {
    fn from([x, y, width, height]: [i64; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<PanelRect> for [i64; 4] {
    fn from(rect: PanelRect) -> Self {
        [rect.x, rect.y, rect.width, rect.height]
    }
}

/// One page and its panels, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Page image path, relative to the manifest's base directory
    /// unless absolute.
    pub filename: String,
    /// Page size `[width, height]` as seen by the segmenter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<[u32; 2]>,
    /// Panel rectangles.
    #[serde(default)]
    pub panels: Vec<PanelRect>,
}

impl PageEntry {
    /// File stem used to name this page's panels.
    ///
    /// Falls back to `"page"` for filenames without a stem.
    #[must_use]
    pub fn stem(&self) -> String {
        Path::new(&self.filename)
            .file_stem()
            .map_or_else(|| "page".to_owned(), |s| s.to_string_lossy().into_owned())
    }
}

/// Parse a manifest from JSON text.
///
/// # Errors
///
/// Returns the underlying [`serde_json::Error`] on malformed input.
pub fn parse_manifest(json: &str) -> Result<Vec<PageEntry>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`IoError::Read`] if the file cannot be read and
/// [`IoError::Manifest`] if it is not a valid manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<PageEntry>, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text).map_err(|source| IoError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Cut `rect` out of `page`.
///
/// The rectangle is clamped to the page; `None` when nothing of it
/// lies inside.
#[must_use]
pub fn crop_panel(page: &RgbImage, rect: PanelRect) -> Option<RgbImage> {
    let (w, h) = page.dimensions();
    let x1 = rect.x.clamp(0, i64::from(w));
    let y1 = rect.y.clamp(0, i64::from(h));
    let x2 = rect.x.saturating_add(rect.width).clamp(0, i64::from(w));
    let y2 = rect.y.saturating_add(rect.height).clamp(0, i64::from(h));
    if x1 >= x2 || y1 >= y2 {
        return None;
    }
    let (x, y) = (u32::try_from(x1).ok()?, u32::try_from(y1).ok()?);
    let (cw, ch) = (u32::try_from(x2 - x1).ok()?, u32::try_from(y2 - y1).ok()?);
    Some(image::imageops::crop_imm(page, x, y, cw, ch).to_image())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_kumiko_output() {
        let json = r#"[
            {"filename": "p1.jpg", "size": [100, 200], "numbering": "ltr",
             "panels": [[0, 0, 50, 60], [50, 0, 50, 60]]},
            {"filename": "p2.png", "panels": []}
        ]"#;
        let pages = parse_manifest(json).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].size, Some([100, 200]));
        assert_eq!(
            pages[0].panels[1],
            PanelRect {
                x: 50,
                y: 0,
                width: 50,
                height: 60
            }
        );
        assert!(pages[1].panels.is_empty());
        assert_eq!(pages[1].size, None);
    }

    #[test]
    fn missing_panels_key_is_empty() {
        let pages = parse_manifest(r#"[{"filename": "a.jpg"}]"#).unwrap();
        assert!(pages[0].panels.is_empty());
    }

    #[test]
    fn rect_serializes_as_array() {
        let rect = PanelRect {
            x: 1,
            y: 2,
            width: 3,
            height: 4,
        };
        assert_eq!(serde_json::to_string(&rect).unwrap(), "[1,2,3,4]");
    }

    #[test]
    fn malformed_rect_is_rejected() {
        assert!(parse_manifest(r#"[{"filename": "a.jpg", "panels": [[1, 2, 3]]}]"#).is_err());
    }

    #[test]
    fn stem_strips_directories_and_extension() {
        let page = PageEntry {
            filename: "vol1/ch2/p003.jpeg".to_owned(),
            size: None,
            panels: Vec::new(),
        };
        assert_eq!(page.stem(), "p003");
    }

    #[test]
    fn crop_inside_page() {
        let page = RgbImage::from_fn(10, 10, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let panel = crop_panel(
            &page,
            PanelRect {
                x: 2,
                y: 3,
                width: 4,
                height: 5,
            },
        )
        .unwrap();
        assert_eq!(panel.dimensions(), (4, 5));
        assert_eq!(panel.get_pixel(0, 0).0, [2, 3, 0]);
    }

    #[test]
    fn crop_is_clamped_to_page() {
        let page = RgbImage::new(10, 10);
        let panel = crop_panel(
            &page,
            PanelRect {
                x: -5,
                y: 6,
                width: 8,
                height: 100,
            },
        )
        .unwrap();
        assert_eq!(panel.dimensions(), (3, 4));
    }

    #[test]
    fn crop_outside_page_is_none() {
        let page = RgbImage::new(10, 10);
        let rect = PanelRect {
            x: 20,
            y: 0,
            width: 5,
            height: 5,
        };
        assert!(crop_panel(&page, rect).is_none());
        let empty = PanelRect {
            x: 1,
            y: 1,
            width: 0,
            height: 5,
        };
        assert!(crop_panel(&page, empty).is_none());
    }

    #[test]
    fn load_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, IoError::Manifest { .. }));
    }
}
