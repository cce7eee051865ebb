//! # Sticker Slicer
//!
//! Turns one sticker sheet image into a LINE sticker package: every tile of
//! the sheet as its own PNG at the sticker size, plus the main and tab icons.
//!
//! # Architecture: Solve Once, Extract Many
//!
//! ```text
//! 1. Solve     (width, height)  →  Layout          (pure arithmetic, no pixels)
//! 2. Extract   sheet + Layout   →  tile buffers    (crop, resize, key out background)
//! 3. Package   tile buffers     →  <stem>_line_stickers/ + manifest.json
//! ```
//!
//! The solver only looks at image dimensions, so `detect` never decodes
//! pixel data. Extraction is a pure function of the decoded sheet and one
//! cell, so every tile is processed independently and in parallel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Layout solver, tile extraction, background removal, image I/O backend |
//! | [`package`] | Plans and builds a package directory from one sheet |
//! | [`config`] | `stickers.toml` loading, validation, and stock defaults |
//! | [`types`] | [`types::Layout`] and [`types::TileCell`], shared by every stage |
//! | [`naming`] | Tile, icon and package directory file names |
//! | [`output`] | CLI output formatting for detect and build |
//!
//! # Design Decisions
//!
//! ## Evenly Divisible Grids Only
//!
//! A layout is only accepted when its rows and columns divide the sheet
//! exactly. Sheets exported from drawing tools at a fixed tile size always
//! satisfy this, and it means tile boundaries never need rounding.
//!
//! ## Deterministic Tie-Breaking
//!
//! Several grids can produce tiles with the same aspect ratio (a 2×4 grid of
//! 740×640 and a 4×8 grid of 370×320 are both exactly 37:32). Ties go to the
//! grid whose tiles already have the sticker size when
//! `layout.prefer_native_tiles` is on, then to discovery order. The result
//! never depends on hash ordering or thread scheduling.
//!
//! ## Corner-Keyed Background Removal
//!
//! Background removal samples the top-left pixel of each resized tile and
//! clears alpha on every pixel within a Euclidean RGB distance of it. It
//! only handles flat backgrounds and is off by default.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod package;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
