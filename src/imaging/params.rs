//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the packaging stage (which decides which tiles to
//! produce) and the pure operations in [`layout`](super::layout),
//! [`background`](super::background) and [`extract`](super::extract).
//!
//! ## Types
//!
//! - [`Threshold`]: RGB distance below which a pixel counts as background. Clamped to `>= 0`.
//! - [`AspectRange`]: Inclusive window of acceptable tile aspect ratios.
//! - [`LayoutParams`]: Everything the grid solver needs besides the sheet size.
//! - [`ExtractParams`]: One tile request: cell, output size, optional background removal.

use crate::types::TileCell;

/// Euclidean RGB distance used by background stripping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f64);

impl Threshold {
    /// Negative and NaN inputs clamp to 0, which strips nothing.
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(30.0)
    }
}

/// Inclusive range of accepted tile aspect ratios (width / height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRange {
    pub min: f64,
    pub max: f64,
}

impl AspectRange {
    pub fn contains(&self, ratio: f64) -> bool {
        self.min <= ratio && ratio <= self.max
    }
}

impl Default for AspectRange {
    fn default() -> Self {
        Self { min: 0.8, max: 1.4 }
    }
}

/// Search parameters for [`solve`](super::layout::solve).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Tile counts to try, in tie-break order.
    pub allowed_counts: Vec<u32>,
    /// Preferred tile width / height.
    pub target_aspect: f64,
    pub aspect_range: AspectRange,
    /// Tile size that wins exact score ties, if any.
    pub native_tile: Option<(u32, u32)>,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            allowed_counts: vec![8, 16, 24, 32, 40],
            target_aspect: 370.0 / 320.0,
            aspect_range: AspectRange::default(),
            native_tile: None,
        }
    }
}

/// A single tile extraction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractParams {
    pub cell: TileCell,
    /// Output dimensions.
    pub width: u32,
    pub height: u32,
    /// Strip the background after resampling when set.
    pub background: Option<Threshold>,
}
