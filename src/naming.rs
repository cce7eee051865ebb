//! Centralized file naming for sticker packages.
//!
//! A package is a flat directory:
//!
//! ```text
//! cats_line_stickers/
//! ├── 01.png       # tiles, 1-based row-major index, two digits minimum
//! ├── 02.png
//! ├── ...
//! ├── main.png     # first tile at the main icon size
//! ├── tab.png      # first tile at the tab icon size
//! └── manifest.json
//! ```
//!
//! The directory is assembled in a hidden `.<name>.partial` sibling and
//! renamed into place once every file is written. An optional archive
//! `<name>.zip` sits next to it.
//!
//! ## Sheet Stems
//!
//! The package name comes from the sheet's file name up to its *first* dot,
//! so `cats.v2.png` packages as `cats_line_stickers/`.

use std::path::{Path, PathBuf};

pub const MAIN_FILE: &str = "main.png";
pub const TAB_FILE: &str = "tab.png";
pub const MANIFEST_FILE: &str = "manifest.json";

const PACKAGE_SUFFIX: &str = "_line_stickers";

/// File name for the tile with the given 1-based index: `01.png`, `32.png`.
pub fn tile_file_name(index: u32) -> String {
    format!("{:02}.png", index)
}

/// Stem of a sheet path: the file name up to its first `.`.
///
/// Falls back to `"stickers"` when the path has no usable file name.
pub fn sheet_stem(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("stickers")
        .to_string()
}

/// Default package directory name for a sheet: `<stem>_line_stickers`.
pub fn package_dir_name(sheet: &Path) -> String {
    format!("{}{}", sheet_stem(sheet), PACKAGE_SUFFIX)
}

/// Sibling of `package_dir` with the given file name.
fn sibling(package_dir: &Path, name: String) -> PathBuf {
    match package_dir.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Hidden directory a package is assembled in: `.<name>.partial`.
///
/// `None` when `package_dir` has no final component (`/`, `..`).
pub fn staging_path(package_dir: &Path) -> Option<PathBuf> {
    let name = package_dir.file_name()?.to_string_lossy();
    Some(sibling(package_dir, format!(".{}.partial", name)))
}

/// Archive written next to a package directory: `<name>.zip`.
pub fn archive_path(package_dir: &Path) -> Option<PathBuf> {
    let name = package_dir.file_name()?.to_string_lossy();
    Some(sibling(package_dir, format!("{}.zip", name)))
}
