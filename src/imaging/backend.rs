//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the packaging
//! stage needs from the outside world: identify, load, and save. Everything
//! between load and save is pure pixel work in this module's siblings.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust, built on
//! the `image` crate. Tests use a recording mock.

use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image I/O backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image into 8-bit RGBA.
    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError>;

    /// Encode an RGBA buffer as PNG.
    fn save_png(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError>;
}
