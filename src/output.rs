//! CLI output formatting for detect and build.
//!
//! # Output Format
//!
//! ## Detect
//!
//! ```text
//! cats.png (2960x1280)
//! Layout: 4 rows × 8 cols = 32 stickers
//!     Tile: 370x320
//! Candidates
//!     001 2×4 (8 tiles, 740x640) Δ0.0000
//!     002 4×8 (32 tiles, 370x320) Δ0.0000 ← selected
//!     003 4×10 (40 tiles, 296x320) Δ0.2312
//! ```
//!
//! ## Build
//!
//! ```text
//! Layout: 4 rows × 8 cols = 32 stickers (370x320 tiles)
//!     001 01.png (row 1, col 1) → 370x320
//!     002 02.png (row 1, col 2) → 370x320
//!     main main.png → 240x240
//!     tab tab.png → 96x74
//! Wrote 32 stickers + main + tab → cats_line_stickers
//!     Background: removed (threshold 30)
//!     Archive: cats_line_stickers.zip
//! ```
//!
//! Build lines for individual files arrive in completion order, so they may
//! interleave differently between runs.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::package::{Detection, OutputKind, PackageEvent, PackageManifest, format_counts};
use crate::types::Layout;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: u32) -> String {
    format!("{:0>3}", pos)
}

/// `Layout: 4 rows × 8 cols = 32 stickers`
fn layout_line(layout: &Layout) -> String {
    format!(
        "Layout: {} rows × {} cols = {} stickers",
        layout.rows, layout.cols, layout.count
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Detect
// ============================================================================

/// Format the result of layout detection.
pub fn format_detection(detection: &Detection, sheet: &Path, allowed_counts: &[u32]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}x{})",
        file_name(sheet),
        detection.width,
        detection.height
    )];

    let Some(layout) = detection.layout else {
        lines.push(format!(
            "No layout found. The sheet must split evenly into {} tiles.",
            format_counts(allowed_counts)
        ));
        return lines;
    };

    lines.push(layout_line(&layout));
    if let Some((w, h)) = layout.tile_size(detection.width, detection.height) {
        lines.push(format!("    Tile: {}x{}", w, h));
    }

    lines.push("Candidates".to_string());
    for (pos, candidate) in detection.candidates.iter().enumerate() {
        let marker = if candidate.layout() == layout {
            " ← selected"
        } else {
            ""
        };
        lines.push(format!(
            "    {} {}×{} ({} tiles, {}x{}) Δ{:.4}{}",
            format_index(pos as u32 + 1),
            candidate.rows,
            candidate.cols,
            candidate.count,
            candidate.tile.0,
            candidate.tile.1,
            candidate.distance,
            marker
        ));
    }
    lines
}

pub fn print_detection(detection: &Detection, sheet: &Path, allowed_counts: &[u32]) {
    for line in format_detection(detection, sheet, allowed_counts) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event.
pub fn format_package_event(event: &PackageEvent) -> Vec<String> {
    match event {
        PackageEvent::LayoutDetected { layout, tile } => {
            vec![format!(
                "{} ({}x{} tiles)",
                layout_line(layout),
                tile.0,
                tile.1
            )]
        }
        PackageEvent::TileWritten {
            kind,
            index,
            cell,
            file,
            width,
            height,
        } => {
            let line = match kind {
                OutputKind::Sticker => format!(
                    "    {} {} (row {}, col {}) → {}x{}",
                    format_index(*index),
                    file,
                    cell.row + 1,
                    cell.col + 1,
                    width,
                    height
                ),
                OutputKind::Main => format!("    main {} → {}x{}", file, width, height),
                OutputKind::Tab => format!("    tab {} → {}x{}", file, width, height),
            };
            vec![line]
        }
    }
}

/// Format the closing summary of a build.
pub fn format_package_summary(
    manifest: &PackageManifest,
    output_dir: &Path,
    archive: Option<&Path>,
) -> Vec<String> {
    let mut parts = vec![format!("{} stickers", manifest.sticker_count())];
    for (kind, label) in [(OutputKind::Main, "main"), (OutputKind::Tab, "tab")] {
        if manifest.files.iter().any(|f| f.kind == kind) {
            parts.push(label.to_string());
        }
    }

    let background = match manifest.background_threshold {
        Some(t) => format!("    Background: removed (threshold {})", t),
        None => "    Background: kept".to_string(),
    };

    let mut lines = vec![
        format!("Wrote {} → {}", parts.join(" + "), output_dir.display()),
        background,
    ];
    if let Some(archive) = archive {
        lines.push(format!("    Archive: {}", archive.display()));
    }
    lines
}

pub fn print_package_summary(manifest: &PackageManifest, output_dir: &Path, archive: Option<&Path>) {
    for line in format_package_summary(manifest, output_dir, archive) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
