//! Image processing on in-memory RGBA buffers.
//!
//! | Operation | Module / function |
//! |---|---|
//! | **Detect layout** | [`layout::solve`]: divisor search over allowed tile counts |
//! | **Strip background** | [`background::strip_background`]: corner-color alpha keying |
//! | **Extract tile** | [`extract::extract_tile`]: crop + Lanczos3 resize |
//! | **Decode / encode** | [`ImageBackend`] + [`RustBackend`] |
//!
//! The module is split into:
//! - **Layout**: Pure grid inference from pixel dimensions (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Background / Extract**: Pure pixel operations on in-memory buffers
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] for file I/O

pub mod background;
pub mod backend;
pub mod extract;
pub mod layout;
mod params;
pub mod rust_backend;

pub use background::strip_background;
pub use backend::{BackendError, Dimensions, ImageBackend};
pub use extract::{ExtractError, extract_tile};
pub use layout::{Candidate, LayoutError, Solution, find_candidates, search, solve};
pub use params::{AspectRange, ExtractParams, LayoutParams, Threshold};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
