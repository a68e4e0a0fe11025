//! paneltrim: crop comic/manga panels and strip their leftover frames.
//!
//! Two modes:
//!
//! - `trim` removes the frame from panel images that were already cut
//!   out of their page.
//! - `pages` cuts panels out of whole pages using a Kumiko-style JSON
//!   manifest, optionally trimming each one.
//!
//! # Usage
//!
//! ```text
//! paneltrim trim --out-dir trimmed/ panel_0.jpg panel_1.jpg
//! paneltrim pages --manifest pages.json --out-dir panels/ --remove-borders
//! ```
//!
//! Set `RUST_LOG=debug` to see why individual panels were left as is.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use paneltrim_io::{BatchOptions, BatchSummary, FsCodec, ImageCodec, OutputLayout};
use paneltrim_pipeline::{BorderConfig, GrayImage, SkeletonizerKind};
use rayon::prelude::*;

/// Crop comic panels and remove their leftover frame lines.
#[derive(Parser)]
#[command(name = "paneltrim", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remove frames from standalone panel images.
    Trim {
        /// Panel images (PNG, JPEG, BMP, WebP).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory receiving the trimmed panels (same file names).
        #[arg(long)]
        out_dir: PathBuf,

        /// Also write every intermediate mask as PNG into this directory.
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        #[command(flatten)]
        border: BorderArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Cut panels out of pages listed in a manifest.
    Pages {
        /// Kumiko-style JSON manifest.
        #[arg(long)]
        manifest: PathBuf,

        /// Directory page filenames are relative to (defaults to the
        /// manifest's directory).
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Directory receiving the panels.
        #[arg(long)]
        out_dir: PathBuf,

        /// Output organization.
        #[arg(long, value_enum, default_value_t = Layout::Grouped)]
        layout: Layout,

        /// Remove the leftover frame from every panel.
        #[arg(long)]
        remove_borders: bool,

        #[command(flatten)]
        border: BorderArgs,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Border-remover parameters.
#[derive(Args)]
struct BorderArgs {
    /// Fraction of each dimension searched for a frame line.
    #[arg(long, default_value_t = BorderConfig::DEFAULT_SEARCH_ZONE_RATIO)]
    search_zone_ratio: f64,

    /// Pixels trimmed inward from each detected frame line.
    #[arg(long, default_value_t = BorderConfig::DEFAULT_INWARD_PADDING)]
    inward_padding: u32,

    /// Thinning strategy for the contour band.
    #[arg(long, value_enum, default_value_t = Thinning::ZhangSuen)]
    skeletonizer: Thinning,

    /// Full border config as a JSON string.
    ///
    /// When provided, the other border flags are ignored. The JSON must
    /// be a valid `BorderConfig` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Execution and output parameters.
#[derive(Args)]
struct RunArgs {
    /// JPEG quality for written panels.
    #[arg(long, default_value_t = FsCodec::DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Worker threads (defaults to one per core).
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    threads: Option<usize>,

    /// Print the batch summary as JSON instead of a human-readable line.
    #[arg(long)]
    json: bool,
}

/// Output layout selection.
#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// One directory per page.
    Grouped,
    /// All panels in one directory, prefixed with the page name.
    Flat,
}

/// Skeletonizer selection.
#[derive(Clone, Copy, ValueEnum)]
enum Thinning {
    /// Zhang-Suen thinning.
    ZhangSuen,
    /// No thinning.
    Identity,
}

/// Build a [`BorderConfig`] from CLI arguments.
///
/// If `--config-json` is provided it is parsed directly and the
/// individual flags are ignored. Either way the result is validated.
fn config_from_cli(args: &BorderArgs) -> Result<BorderConfig, String> {
    let config = if let Some(ref json) = args.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        BorderConfig {
            search_zone_ratio: args.search_zone_ratio,
            inward_padding: args.inward_padding,
            skeletonizer: match args.skeletonizer {
                Thinning::ZhangSuen => SkeletonizerKind::ZhangSuen,
                Thinning::Identity => SkeletonizerKind::Identity,
            },
        }
    };
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let run = match &cli.command {
        Command::Trim { run, .. } | Command::Pages { run, .. } => run,
    };
    if let Some(threads) = run.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        eprintln!("Error starting {threads} worker threads: {e}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Trim {
            files,
            out_dir,
            debug_dir,
            border,
            run,
        } => run_trim(files, out_dir, debug_dir.as_deref(), border, run),
        Command::Pages {
            manifest,
            base_dir,
            out_dir,
            layout,
            remove_borders,
            border,
            run,
        } => {
            let base_dir = base_dir.clone().unwrap_or_else(|| {
                manifest
                    .parent()
                    .map_or_else(PathBuf::new, Path::to_path_buf)
            });
            run_pages(
                manifest,
                &base_dir,
                out_dir,
                *layout,
                *remove_borders,
                border,
                run,
            )
        }
    };

    match result {
        Ok(summary) => {
            if run.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error serializing summary: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("{}", report(&summary));
            }
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run_trim(
    files: &[PathBuf],
    out_dir: &Path,
    debug_dir: Option<&Path>,
    border: &BorderArgs,
    run: &RunArgs,
) -> Result<BatchSummary, String> {
    let config = config_from_cli(border)?;
    let codec = FsCodec::with_jpeg_quality(run.jpeg_quality);
    log::debug!("trimming {} panels with {config:?}", files.len());

    if let Some(dir) = debug_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating {}: {e}", dir.display()))?;
        files
            .par_iter()
            .for_each(|file| write_debug_stages(&codec, file, dir, &config));
    }

    paneltrim_io::process_panels(files, out_dir, &codec, &config).map_err(|e| e.to_string())
}

fn run_pages(
    manifest: &Path,
    base_dir: &Path,
    out_dir: &Path,
    layout: Layout,
    remove_borders: bool,
    border: &BorderArgs,
    run: &RunArgs,
) -> Result<BatchSummary, String> {
    let options = BatchOptions {
        layout: match layout {
            Layout::Grouped => OutputLayout::Grouped,
            Layout::Flat => OutputLayout::Flat,
        },
        remove_borders,
        border: config_from_cli(border)?,
    };
    let pages = paneltrim_io::load_manifest(manifest).map_err(|e| e.to_string())?;
    log::debug!("{} pages in {}", pages.len(), manifest.display());

    let codec = FsCodec::with_jpeg_quality(run.jpeg_quality);
    paneltrim_io::process_pages(&pages, base_dir, out_dir, &codec, &options)
        .map_err(|e| e.to_string())
}

/// Write each intermediate raster of one trim run as
/// `<dir>/<stem>_<stage>.png`. Failures are logged, never fatal.
fn write_debug_stages(codec: &FsCodec, file: &Path, dir: &Path, config: &BorderConfig) {
    let panel = match codec.read(file) {
        Ok(panel) => panel,
        Err(e) => {
            log::warn!("no debug output: {e}");
            return;
        }
    };
    let stem = file
        .file_stem()
        .map_or_else(|| "panel".into(), |s| s.to_string_lossy());
    let staged = paneltrim_pipeline::trim_staged(&panel, config);
    log::info!(
        "{} ({:?}): bounding {:?}, outcome {}",
        file.display(),
        panel.dimensions(),
        staged.bounding,
        staged
            .outcome
            .passthrough()
            .map_or_else(|| "trimmed".to_owned(), |reason| reason.to_string()),
    );

    let masks: [(&str, Option<&GrayImage>); 4] = [
        ("binary", staged.binary.as_ref()),
        ("filled", staged.filled.as_ref()),
        ("hollow", staged.hollow.as_ref()),
        ("skeleton", staged.skeleton.as_ref()),
    ];
    let padded = staged.padded.as_ref().map(|p| ("padded", p.clone()));
    let rasters = padded.into_iter().chain(masks.into_iter().filter_map(|(name, mask)| {
        mask.map(|m| (name, image::DynamicImage::ImageLuma8(m.clone()).to_rgb8()))
    }));

    for (name, raster) in rasters {
        let path = dir.join(format!("{stem}_{name}.png"));
        if let Err(e) = codec.write(&path, &raster) {
            log::warn!("{e}");
        }
    }
}

/// One-line human-readable summary.
fn report(summary: &BatchSummary) -> String {
    let mut line = format!(
        "{} panels written ({} trimmed) from {} inputs",
        summary.panels_written, summary.panels_trimmed, summary.inputs,
    );
    if summary.inputs_skipped > 0 {
        line.push_str(&format!(", {} inputs skipped", summary.inputs_skipped));
    }
    if summary.panels_failed > 0 {
        line.push_str(&format!(", {} writes failed", summary.panels_failed));
    }
    if summary.panels_empty > 0 {
        line.push_str(&format!(", {} empty panels", summary.panels_empty));
    }
    line
}
