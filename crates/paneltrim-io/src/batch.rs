//! Parallel batch drivers.
//!
//! Pages (or standalone panel files) are independent units of work and
//! are fanned out over the current rayon pool. A bad input never aborts
//! the batch: unreadable pages are skipped and failed writes are
//! counted, both with a `warn!`. Only a batch that produced nothing at
//! all is an error.

use std::path::{Path, PathBuf};

use paneltrim_pipeline::{BorderConfig, RgbImage, trim};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::codec::ImageCodec;
use crate::error::IoError;
use crate::layout::OutputLayout;
use crate::manifest::{PageEntry, crop_panel};

/// Settings for [`process_pages`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// How panel files are named and grouped.
    pub layout: OutputLayout,
    /// Run the border remover on every panel before writing it.
    pub remove_borders: bool,
    /// Border-remover configuration, used when `remove_borders` is set.
    pub border: BorderConfig,
}

/// Counters collected over one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Input files (pages or panels) considered.
    pub inputs: usize,
    /// Inputs that could not be read or decoded.
    pub inputs_skipped: usize,
    /// Panels written to disk.
    pub panels_written: usize,
    /// Panels whose write failed.
    pub panels_failed: usize,
    /// Panel rectangles that fell entirely outside their page.
    pub panels_empty: usize,
    /// Written panels that had a frame removed.
    pub panels_trimmed: usize,
}

impl BatchSummary {
    /// Sum two partial summaries.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            inputs: self.inputs + other.inputs,
            inputs_skipped: self.inputs_skipped + other.inputs_skipped,
            panels_written: self.panels_written + other.panels_written,
            panels_failed: self.panels_failed + other.panels_failed,
            panels_empty: self.panels_empty + other.panels_empty,
            panels_trimmed: self.panels_trimmed + other.panels_trimmed,
        }
    }

    const fn skipped_input() -> Self {
        Self {
            inputs: 1,
            inputs_skipped: 1,
            panels_written: 0,
            panels_failed: 0,
            panels_empty: 0,
            panels_trimmed: 0,
        }
    }
}

/// Cut every panel listed in `pages` and write it under `out_dir`.
///
/// Page filenames are resolved against `base_dir`. Pages run in
/// parallel on the current rayon pool.
///
/// # Errors
///
/// Returns [`IoError::Write`] if `out_dir` cannot be created and
/// [`IoError::NoPanelsWritten`] if the batch wrote nothing.
pub fn process_pages<C: ImageCodec + Sync>(
    pages: &[PageEntry],
    base_dir: &Path,
    out_dir: &Path,
    codec: &C,
    options: &BatchOptions,
) -> Result<BatchSummary, IoError> {
    create_dir(out_dir)?;

    let summary = pages
        .par_iter()
        .map(|page| process_page(page, base_dir, out_dir, codec, options))
        .reduce(BatchSummary::default, BatchSummary::merge);

    finish(summary)
}

/// Remove the frame from each panel file in `inputs`, writing the
/// result to `<out_dir>/<file name>`.
///
/// Panels that need no trimming are written unchanged.
///
/// # Errors
///
/// Returns [`IoError::Write`] if `out_dir` cannot be created and
/// [`IoError::NoPanelsWritten`] if the batch wrote nothing.
pub fn process_panels<C: ImageCodec + Sync>(
    inputs: &[PathBuf],
    out_dir: &Path,
    codec: &C,
    config: &BorderConfig,
) -> Result<BatchSummary, IoError> {
    create_dir(out_dir)?;

    let summary = inputs
        .par_iter()
        .map(|input| {
            let Some(name) = input.file_name() else {
                log::warn!("skipping {}: not a file path", input.display());
                return BatchSummary::skipped_input();
            };
            let panel = match codec.read(input) {
                Ok(panel) => panel,
                Err(err) => {
                    log::warn!("skipping panel: {err}");
                    return BatchSummary::skipped_input();
                }
            };
            let mut summary = BatchSummary {
                inputs: 1,
                ..BatchSummary::default()
            };
            write_panel(codec, &out_dir.join(name), &panel, Some(config), &mut summary);
            summary
        })
        .reduce(BatchSummary::default, BatchSummary::merge);

    finish(summary)
}

fn process_page<C: ImageCodec>(
    page: &PageEntry,
    base_dir: &Path,
    out_dir: &Path,
    codec: &C,
    options: &BatchOptions,
) -> BatchSummary {
    let path = base_dir.join(&page.filename);
    let image = match codec.read(&path) {
        Ok(image) => image,
        Err(err) => {
            log::warn!("skipping page: {err}");
            return BatchSummary::skipped_input();
        }
    };

    let mut summary = BatchSummary {
        inputs: 1,
        ..BatchSummary::default()
    };
    let stem = page.stem();
    if let Err(err) = create_dir(&options.layout.page_dir(out_dir, &stem)) {
        log::warn!("{err}");
        summary.panels_failed = page.panels.len();
        return summary;
    }

    let border = options.remove_borders.then_some(&options.border);
    for (index, &rect) in page.panels.iter().enumerate() {
        let Some(panel) = crop_panel(&image, rect) else {
            log::warn!(
                "panel {index} of {} lies outside the page, skipping",
                page.filename
            );
            summary.panels_empty += 1;
            continue;
        };
        let target = options.layout.panel_path(out_dir, &stem, index);
        write_panel(codec, &target, &panel, border, &mut summary);
    }
    log::debug!(
        "{}: {} of {} panels written",
        page.filename,
        summary.panels_written,
        page.panels.len()
    );
    summary
}

/// Optionally trim `panel`, then write it to `target`, tallying the result.
fn write_panel<C: ImageCodec>(
    codec: &C,
    target: &Path,
    panel: &RgbImage,
    border: Option<&BorderConfig>,
    summary: &mut BatchSummary,
) {
    let (image, trimmed) = match border {
        Some(config) => {
            let outcome = trim(panel, config);
            let trimmed = outcome.is_trimmed();
            if let Some(reason) = outcome.passthrough() {
                log::debug!("{}: kept as is ({reason})", target.display());
            }
            (outcome.into_image(panel), trimmed)
        }
        None => (std::borrow::Cow::Borrowed(panel), false),
    };

    match codec.write(target, &image) {
        Ok(()) => {
            summary.panels_written += 1;
            if trimmed {
                summary.panels_trimmed += 1;
            }
        }
        Err(err) => {
            log::warn!("{err}");
            summary.panels_failed += 1;
        }
    }
}

fn create_dir(dir: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|source| IoError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

fn finish(summary: BatchSummary) -> Result<BatchSummary, IoError> {
    log::info!(
        "{} inputs ({} skipped), {} panels written ({} trimmed, {} failed)",
        summary.inputs,
        summary.inputs_skipped,
        summary.panels_written,
        summary.panels_trimmed,
        summary.panels_failed
    );
    if summary.panels_written == 0 {
        return Err(IoError::NoPanelsWritten);
    }
    Ok(summary)
}
