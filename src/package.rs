//! Sticker package generation.
//!
//! Takes one sticker sheet and produces a package directory: every tile at
//! the sticker size, the first tile again at the main and tab icon sizes,
//! and a `manifest.json` describing what was written. [`write_archive`]
//! bundles a finished package into a single `.zip` for upload.
//!
//! ## Pipeline
//!
//! ```text
//! sheet.png ─ load ─▶ RgbaImage ─ solve ─▶ Layout
//!                                            │
//!                         plan_package ◀─────┘
//!                              │
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!      extract 01..NN     extract main     extract tab      (parallel)
//!              │               │                │
//!              └──── save_png ─┴────────────────┘
//!                              │
//!                        manifest.json
//!                              │
//!              rename .<name>.partial → <name>     [write_archive → <name>.zip]
//! ```
//!
//! ## Replacing a Package
//!
//! Files are written into a hidden staging directory next to the target. Only
//! when every file and the manifest are written does the staging directory
//! replace the target, so a rebuild never mixes old and new stickers and a
//! failed build leaves the previous package untouched. An existing target is
//! only replaced when it is empty or holds a `manifest.json`.
//!
//! ## Default Configuration
//!
//! ```text
//! Sticker size: 370×320
//! Main icon:    240×240 (tile 01)
//! Tab icon:     96×74   (tile 01)
//! Tile counts:  8, 16, 24, 32, 40
//! ```
//!
//! ## Parallel Processing
//!
//! Tiles are extracted and encoded in parallel using
//! [rayon](https://docs.rs/rayon). Each job reads only its own source cell
//! and owns its output buffer, so no locking is involved. The manifest lists
//! files in plan order regardless of completion order.

use crate::config::{SizesConfig, StickerConfig};
use crate::imaging::{
    BackendError, Candidate, ExtractError, ExtractParams, ImageBackend, LayoutError, RustBackend,
    Threshold, extract_tile, is_supported_input, search, solve,
};
use crate::naming;
use crate::types::{Layout, TileCell};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Tile extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Not an image file (expected PNG, JPEG or WebP): {0}")]
    UnsupportedInput(PathBuf),
    #[error("Output path exists and is not a sticker package: {0}")]
    OutputNotPackage(PathBuf),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error(
        "No valid layout found for a {width}x{height} image. The sheet must split evenly into {} tiles.",
        format_counts(.counts)
    )]
    LayoutNotFound {
        width: u32,
        height: u32,
        counts: Vec<u32>,
    },
}

/// `[8, 16, 24]` → `"8, 16 or 24"`.
pub fn format_counts(counts: &[u32]) -> String {
    match counts {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(u32::to_string).collect();
            format!("{} or {}", init.join(", "), last)
        }
    }
}

/// Which package slot an output fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Sticker,
    Main,
    Tab,
}

/// One planned extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileJob {
    pub kind: OutputKind,
    /// 1-based row-major index of the source cell.
    pub index: u32,
    pub cell: TileCell,
    pub width: u32,
    pub height: u32,
    /// File name inside the package directory.
    pub file: String,
}

/// Plan every output of a package without executing anything.
///
/// Stickers come first in row-major order, then the main icon, then the tab
/// icon. Both icons are cut from the top-left cell.
pub fn plan_package(layout: &Layout, sizes: &SizesConfig) -> Vec<TileJob> {
    let [sticker_w, sticker_h] = sizes.sticker;
    let mut jobs: Vec<TileJob> = layout
        .cells()
        .map(|cell| {
            let index = layout.index_of(cell);
            TileJob {
                kind: OutputKind::Sticker,
                index,
                cell,
                width: sticker_w,
                height: sticker_h,
                file: naming::tile_file_name(index),
            }
        })
        .collect();

    for (kind, [width, height], file) in [
        (OutputKind::Main, sizes.main, naming::MAIN_FILE),
        (OutputKind::Tab, sizes.tab, naming::TAB_FILE),
    ] {
        jobs.push(TileJob {
            kind,
            index: layout.index_of(TileCell::ORIGIN),
            cell: TileCell::ORIGIN,
            width,
            height,
            file: file.to_string(),
        });
    }

    jobs
}

/// Progress events emitted while a package is built.
#[derive(Debug, Clone, PartialEq)]
pub enum PackageEvent {
    LayoutDetected {
        layout: Layout,
        tile: (u32, u32),
    },
    TileWritten {
        kind: OutputKind,
        index: u32,
        cell: TileCell,
        file: String,
        width: u32,
        height: u32,
    },
}

/// A file written into the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub kind: OutputKind,
    pub index: u32,
    pub row: u32,
    pub col: u32,
    pub file: String,
    pub width: u32,
    pub height: u32,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Sheet file name.
    pub source: String,
    /// Sheet dimensions (width, height).
    pub dimensions: (u32, u32),
    pub layout: Layout,
    /// Source tile size before resampling (width, height).
    pub tile_size: (u32, u32),
    /// Threshold used for background removal, absent when disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_threshold: Option<f64>,
    pub files: Vec<PackageEntry>,
}

impl PackageManifest {
    pub fn sticker_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.kind == OutputKind::Sticker)
            .count()
    }
}

/// Result of layout detection on a sheet, without decoding its pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub width: u32,
    pub height: u32,
    pub layout: Option<Layout>,
    /// Every acceptable layout, in discovery order.
    pub candidates: Vec<Candidate>,
}

/// Detect the layout of a sheet from its header dimensions.
pub fn detect(sheet: &Path, config: &StickerConfig) -> Result<Detection, PackageError> {
    detect_with_backend(&RustBackend::new(), sheet, config)
}

/// Detect using a specific backend (allows testing with mock).
pub fn detect_with_backend(
    backend: &impl ImageBackend,
    sheet: &Path,
    config: &StickerConfig,
) -> Result<Detection, PackageError> {
    check_input(sheet)?;
    let dims = backend.identify(sheet)?;
    let solution = search(dims.width, dims.height, &config.layout_params())?;
    Ok(Detection {
        width: dims.width,
        height: dims.height,
        layout: solution.layout,
        candidates: solution.candidates,
    })
}

/// Build a sticker package for `sheet` into `output_dir`.
///
/// Decodes the sheet, detects its layout, then extracts and encodes every
/// planned output in parallel and writes `manifest.json`. The finished
/// directory replaces `output_dir` atomically (see the
/// [module docs](self#replacing-a-package)). Progress is reported on
/// `events` when given.
pub fn build_package(
    sheet: &Path,
    output_dir: &Path,
    config: &StickerConfig,
    background: Option<Threshold>,
    events: Option<Sender<PackageEvent>>,
) -> Result<PackageManifest, PackageError> {
    let backend = RustBackend::new();
    build_package_with_backend(&backend, sheet, output_dir, config, background, events)
}

/// Build a package using a specific backend (allows testing with mock).
pub fn build_package_with_backend(
    backend: &impl ImageBackend,
    sheet: &Path,
    output_dir: &Path,
    config: &StickerConfig,
    background: Option<Threshold>,
    events: Option<Sender<PackageEvent>>,
) -> Result<PackageManifest, PackageError> {
    check_input(sheet)?;

    let source = backend.load(sheet)?;
    let (width, height) = source.dimensions();
    log::info!("Loaded {} ({}x{})", sheet.display(), width, height);

    let layout = solve(width, height, &config.layout_params())?.ok_or_else(|| {
        PackageError::LayoutNotFound {
            width,
            height,
            counts: config.layout.allowed_counts.clone(),
        }
    })?;
    // solve only returns layouts that divide the sheet
    let tile_size = (width / layout.cols, height / layout.rows);
    log::info!(
        "Detected {}x{} layout ({} tiles of {}x{})",
        layout.rows,
        layout.cols,
        layout.count,
        tile_size.0,
        tile_size.1
    );
    if let Some(tx) = &events {
        tx.send(PackageEvent::LayoutDetected {
            layout,
            tile: tile_size,
        })
        .ok();
    }

    check_target(output_dir)?;
    let staging = naming::staging_path(output_dir)
        .ok_or_else(|| PackageError::OutputNotPackage(output_dir.to_path_buf()))?;
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let sheet_name = sheet
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let assembled = assemble(
        backend,
        &source,
        &staging,
        Assembly {
            sheet_name,
            layout,
            tile_size,
            sizes: &config.sizes,
            background,
        },
        events.as_ref(),
    );
    let manifest = match assembled {
        Ok(manifest) => manifest,
        Err(e) => {
            fs::remove_dir_all(&staging).ok();
            return Err(e);
        }
    };

    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    fs::rename(&staging, output_dir)?;
    log::info!("Wrote package {}", output_dir.display());

    Ok(manifest)
}

/// What a package is built from, besides the decoded sheet.
struct Assembly<'a> {
    sheet_name: String,
    layout: Layout,
    tile_size: (u32, u32),
    sizes: &'a SizesConfig,
    background: Option<Threshold>,
}

/// Write every planned output and the manifest into `dir`.
fn assemble(
    backend: &impl ImageBackend,
    source: &image::RgbaImage,
    dir: &Path,
    assembly: Assembly<'_>,
    events: Option<&Sender<PackageEvent>>,
) -> Result<PackageManifest, PackageError> {
    let Assembly {
        sheet_name,
        layout,
        tile_size,
        sizes,
        background,
    } = assembly;

    let jobs = plan_package(&layout, sizes);
    let files = jobs
        .par_iter()
        .map(|job| {
            let tile = extract_tile(
                source,
                &layout,
                &ExtractParams {
                    cell: job.cell,
                    width: job.width,
                    height: job.height,
                    background,
                },
            )?;
            backend.save_png(&tile, &dir.join(&job.file))?;
            log::debug!("Wrote {} ({}x{})", job.file, job.width, job.height);

            if let Some(tx) = events {
                tx.send(PackageEvent::TileWritten {
                    kind: job.kind,
                    index: job.index,
                    cell: job.cell,
                    file: job.file.clone(),
                    width: job.width,
                    height: job.height,
                })
                .ok();
            }

            Ok(PackageEntry {
                kind: job.kind,
                index: job.index,
                row: job.cell.row,
                col: job.cell.col,
                file: job.file.clone(),
                width: job.width,
                height: job.height,
            })
        })
        .collect::<Result<Vec<_>, PackageError>>()?;

    let manifest = PackageManifest {
        source: sheet_name,
        dimensions: source.dimensions(),
        layout,
        tile_size,
        background_threshold: background.map(Threshold::value),
        files,
    };

    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(dir.join(naming::MANIFEST_FILE), json)?;

    Ok(manifest)
}

/// Refuse to replace anything that is not a previous package.
fn check_target(output_dir: &Path) -> Result<(), PackageError> {
    if !output_dir.exists() {
        return Ok(());
    }
    let is_package = output_dir.is_dir()
        && (output_dir.join(naming::MANIFEST_FILE).is_file()
            || fs::read_dir(output_dir)?.next().is_none());
    if is_package {
        Ok(())
    } else {
        Err(PackageError::OutputNotPackage(output_dir.to_path_buf()))
    }
}

/// Bundle a built package into a zip archive.
///
/// Entries are the manifest's files in plan order followed by
/// `manifest.json`, all at the archive root. The archive is written to a
/// `.partial` file first and renamed over `archive` when complete.
pub fn write_archive(
    package_dir: &Path,
    manifest: &PackageManifest,
    archive: &Path,
) -> Result<(), PackageError> {
    let partial = archive.with_extension("zip.partial");
    let result = write_zip_entries(package_dir, manifest, &partial);
    if result.is_err() {
        fs::remove_file(&partial).ok();
        return result;
    }
    fs::rename(&partial, archive)?;
    log::info!("Wrote archive {}", archive.display());
    Ok(())
}

fn write_zip_entries(
    package_dir: &Path,
    manifest: &PackageManifest,
    path: &Path,
) -> Result<(), PackageError> {
    let mut zip = ZipWriter::new(BufWriter::new(fs::File::create(path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let names = manifest
        .files
        .iter()
        .map(|f| f.file.as_str())
        .chain([naming::MANIFEST_FILE]);
    for name in names {
        zip.start_file(name, options)?;
        zip.write_all(&fs::read(package_dir.join(name))?)?;
    }
    zip.finish()?.flush()?;
    Ok(())
}

/// Reject non-image and missing inputs before touching the backend.
fn check_input(sheet: &Path) -> Result<(), PackageError> {
    if !is_supported_input(sheet) {
        log::warn!("Skipping {}: not a supported image", sheet.display());
        return Err(PackageError::UnsupportedInput(sheet.to_path_buf()));
    }
    if !sheet.exists() {
        return Err(PackageError::SourceNotFound(sheet.to_path_buf()));
    }
    Ok(())
}
