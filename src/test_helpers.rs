//! Shared test utilities for the sticker-slicer test suite.
//!
//! Builds synthetic sticker sheets in memory so layout, extraction and
//! packaging tests never need fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let layout = Layout::new(4, 8);
//! let sheet = sheet(layout, 370, 320);
//! assert_eq!(sheet.dimensions(), (2960, 1280));
//! assert_eq!(sheet.get_pixel(0, 0).0[..3], tile_color(1));
//! ```

use image::{Rgba, RgbaImage};

use crate::types::Layout;

// =========================================================================
// Synthetic sheets
// =========================================================================

/// Flat RGB color for the tile with the given 1-based index.
///
/// Neighbouring indices land far apart in RGB space.
pub fn tile_color(index: u32) -> [u8; 3] {
    [
        ((index * 53) % 256) as u8,
        ((index * 97 + 40) % 256) as u8,
        ((index * 151 + 80) % 256) as u8,
    ]
}

/// A sheet of `layout` flat-colored tiles, each `tile_w × tile_h`.
pub fn sheet(layout: Layout, tile_w: u32, tile_h: u32) -> RgbaImage {
    RgbaImage::from_fn(layout.cols * tile_w, layout.rows * tile_h, |x, y| {
        let index = (y / tile_h) * layout.cols + (x / tile_w) + 1;
        let [r, g, b] = tile_color(index);
        Rgba([r, g, b, 255])
    })
}

/// A sheet where every tile is a colored disc on a shared flat background.
pub fn sticker_sheet(layout: Layout, tile_w: u32, tile_h: u32, background: [u8; 3]) -> RgbaImage {
    let radius = (tile_w.min(tile_h) / 3) as i64;
    RgbaImage::from_fn(layout.cols * tile_w, layout.rows * tile_h, |x, y| {
        let dx = (x % tile_w) as i64 - (tile_w / 2) as i64;
        let dy = (y % tile_h) as i64 - (tile_h / 2) as i64;
        if dx * dx + dy * dy <= radius * radius {
            let index = (y / tile_h) * layout.cols + (x / tile_w) + 1;
            let [r, g, b] = tile_color(index);
            Rgba([r, g, b, 255])
        } else {
            let [r, g, b] = background;
            Rgba([r, g, b, 255])
        }
    })
}
