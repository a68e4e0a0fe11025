//! Where extracted panels land on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory layout for panels cut from pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// One directory per page: `<out>/<stem>/panel_<i>.jpg`.
    #[default]
    Grouped,
    /// Everything side by side: `<out>/<stem>_panel_<i>.jpg`.
    Flat,
}

impl OutputLayout {
    /// Destination of panel `index` of the page named `stem`.
    #[must_use]
    pub fn panel_path(self, out_dir: &Path, stem: &str, index: usize) -> PathBuf {
        match self {
            Self::Grouped => out_dir.join(stem).join(format!("panel_{index}.jpg")),
            Self::Flat => out_dir.join(format!("{stem}_panel_{index}.jpg")),
        }
    }

    /// Directory that must exist before the page's panels are written.
    #[must_use]
    pub fn page_dir(self, out_dir: &Path, stem: &str) -> PathBuf {
        match self {
            Self::Grouped => out_dir.join(stem),
            Self::Flat => out_dir.to_path_buf(),
        }
    }
}
