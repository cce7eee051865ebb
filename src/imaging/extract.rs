//! Tile extraction: crop one grid cell and resample it to an output size.
//!
//! Resampling always uses Lanczos3, the same filter the rest of the crate
//! uses for downscaling. Background stripping, when requested, runs on the
//! final-size buffer so interpolation never blends stripped pixels back in.

use super::background::strip_background;
use super::params::ExtractParams;
use crate::types::Layout;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("tile ({row}, {col}) is outside a {rows}x{cols} layout")]
    OutOfBounds {
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    },
    #[error("{width}x{height} image does not divide into a {rows}x{cols} layout")]
    LayoutMismatch {
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
    },
    #[error("target size {width}x{height} must be non-zero")]
    EmptyTarget { width: u32, height: u32 },
}

/// Produce one tile of `source` at exactly `params.width × params.height`.
///
/// Reads only the cell's source region; the returned buffer is owned by the
/// caller. Safe to call concurrently for different cells.
pub fn extract_tile(
    source: &RgbaImage,
    layout: &Layout,
    params: &ExtractParams,
) -> Result<RgbaImage, ExtractError> {
    let cell = params.cell;
    if cell.row >= layout.rows || cell.col >= layout.cols {
        return Err(ExtractError::OutOfBounds {
            row: cell.row,
            col: cell.col,
            rows: layout.rows,
            cols: layout.cols,
        });
    }
    if params.width == 0 || params.height == 0 {
        return Err(ExtractError::EmptyTarget {
            width: params.width,
            height: params.height,
        });
    }

    let (width, height) = source.dimensions();
    let (tile_w, tile_h) =
        layout
            .tile_size(width, height)
            .ok_or(ExtractError::LayoutMismatch {
                width,
                height,
                rows: layout.rows,
                cols: layout.cols,
            })?;

    let region = imageops::crop_imm(source, cell.col * tile_w, cell.row * tile_h, tile_w, tile_h)
        .to_image();
    let mut tile = imageops::resize(&region, params.width, params.height, FilterType::Lanczos3);

    if let Some(threshold) = params.background {
        strip_background(&mut tile, threshold);
    }

    Ok(tile)
}
