//! Grid layout detection.
//!
//! A sticker sheet carries no markup: the only evidence of its grid is the
//! pixel size. [`solve`] tries every `rows × cols` factorisation of every
//! allowed tile count, keeps the ones that cut the sheet into whole-pixel
//! tiles with a plausible aspect ratio, and picks the one closest to the
//! target aspect.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Tie-breaking
//!
//! Scores are compared exactly. Among equal scores the earliest candidate
//! wins, where discovery order is the allowed-count order first and
//! ascending `rows` second. When [`LayoutParams::native_tile`] is set, a
//! candidate whose tile size matches it exactly is promoted ahead of the
//! other equal-score candidates:
//!
//! ```text
//! 2960×1280, target 1.15625
//!   count  8: 2×4 → 740×640 tiles, distance 0
//!   count 32: 4×8 → 370×320 tiles, distance 0   ← native 370×320 wins
//! ```

use super::params::LayoutParams;
use crate::types::Layout;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid image dimensions {width}x{height}: both must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },
}

/// A layout that passed the divisibility and aspect checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub rows: u32,
    pub cols: u32,
    pub count: u32,
    /// Source tile size (width, height).
    pub tile: (u32, u32),
    /// `|tile aspect - target aspect|`.
    pub distance: f64,
}

impl Candidate {
    pub fn layout(&self) -> Layout {
        Layout {
            rows: self.rows,
            cols: self.cols,
            count: self.count,
        }
    }
}

/// Collect every acceptable candidate in discovery order.
///
/// Discovery order is the order of `params.allowed_counts`, then ascending
/// row count within each count.
pub fn find_candidates(width: u32, height: u32, params: &LayoutParams) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for &count in &params.allowed_counts {
        for rows in 1..=count {
            if count % rows != 0 {
                continue;
            }
            let cols = count / rows;

            // Whole-pixel tiles only
            if width % cols != 0 || height % rows != 0 {
                continue;
            }
            let tile_w = width / cols;
            let tile_h = height / rows;
            let ratio = tile_w as f64 / tile_h as f64;

            if !params.aspect_range.contains(ratio) {
                continue;
            }

            candidates.push(Candidate {
                rows,
                cols,
                count,
                tile: (tile_w, tile_h),
                distance: (ratio - params.target_aspect).abs(),
            });
        }
    }

    candidates
}

/// Every acceptable candidate together with the one [`solve`] picks.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Candidates in discovery order.
    pub candidates: Vec<Candidate>,
    pub layout: Option<Layout>,
}

/// Run the divisor search once and select the best candidate.
pub fn search(width: u32, height: u32, params: &LayoutParams) -> Result<Solution, LayoutError> {
    if width == 0 || height == 0 {
        return Err(LayoutError::InvalidDimensions { width, height });
    }

    let candidates = find_candidates(width, height, params);
    log::debug!(
        "{}x{}: {} layout candidate(s) {:?}",
        width,
        height,
        candidates.len(),
        candidates
            .iter()
            .map(|c| format!("{}x{}@{:.5}", c.rows, c.cols, c.distance))
            .collect::<Vec<_>>()
    );

    let is_native = |c: &Candidate| params.native_tile == Some(c.tile);

    // min_by returns the first of equal minima, so discovery order breaks ties
    let layout = candidates
        .iter()
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| is_native(b).cmp(&is_native(a)))
        })
        .map(Candidate::layout);

    Ok(Solution { candidates, layout })
}

/// Infer the grid layout of a `width × height` sheet.
///
/// Returns `Ok(None)` when no allowed count tiles the sheet acceptably.
/// That is an ordinary outcome; the caller decides how to report it.
pub fn solve(width: u32, height: u32, params: &LayoutParams) -> Result<Option<Layout>, LayoutError> {
    Ok(search(width, height, params)?.layout)
}
