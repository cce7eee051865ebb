//! Sticker package configuration.
//!
//! Handles loading, validating, and merging the configuration file. Every
//! constant the core needs (output sizes, allowed tile counts, aspect window,
//! background threshold) lives here rather than in the core, so a different
//! sticker platform only needs a different config file.
//!
//! ## Config File Location
//!
//! The CLI reads `stickers.toml` from the working directory, or the file
//! named by `--config`. A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [sizes]
//! sticker = [370, 320]      # Per-tile output size [width, height]
//! main = [240, 240]         # Main icon size
//! tab = [96, 74]            # Tab icon size
//!
//! [layout]
//! allowed_counts = [8, 16, 24, 32, 40]  # Tile counts tried, in tie-break order
//! target_aspect = [370, 320]            # Preferred tile width:height
//! aspect_range = [0.8, 1.4]             # Accepted tile aspect window
//! prefer_native_tiles = true            # Equal scores: prefer sticker-sized tiles
//!
//! [background]
//! remove = false            # Strip the flat background from every output
//! threshold = 30.0          # RGB distance counted as background
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [background]
//! remove = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{AspectRange, LayoutParams, Threshold};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Largest tile count accepted in `layout.allowed_counts`.
pub const MAX_TILE_COUNT: u32 = 1024;

/// Package configuration loaded from `stickers.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StickerConfig {
    /// Output sizes for stickers and icons.
    pub sizes: SizesConfig,
    /// Grid detection settings.
    pub layout: LayoutConfig,
    /// Background removal settings.
    pub background: BackgroundConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl StickerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, [w, h]) in [
            ("sizes.sticker", self.sizes.sticker),
            ("sizes.main", self.sizes.main),
            ("sizes.tab", self.sizes.tab),
        ] {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name} values must be non-zero"
                )));
            }
        }
        if self.layout.allowed_counts.is_empty() {
            return Err(ConfigError::Validation(
                "layout.allowed_counts must not be empty".into(),
            ));
        }
        if self.layout.allowed_counts.contains(&0) {
            return Err(ConfigError::Validation(
                "layout.allowed_counts values must be non-zero".into(),
            ));
        }
        if let Some(count) = self
            .layout
            .allowed_counts
            .iter()
            .find(|&&c| c > MAX_TILE_COUNT)
        {
            return Err(ConfigError::Validation(format!(
                "layout.allowed_counts value {count} exceeds the maximum of {MAX_TILE_COUNT}"
            )));
        }
        if self.layout.target_aspect[0] == 0 || self.layout.target_aspect[1] == 0 {
            return Err(ConfigError::Validation(
                "layout.target_aspect values must be non-zero".into(),
            ));
        }
        let [min, max] = self.layout.aspect_range;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(ConfigError::Validation(
                "layout.aspect_range must be [min, max] with 0 < min <= max".into(),
            ));
        }
        let threshold = self.background.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Validation(
                "background.threshold must be a finite value >= 0".into(),
            ));
        }
        Ok(())
    }

    /// Solver parameters derived from the `[layout]` and `[sizes]` sections.
    pub fn layout_params(&self) -> LayoutParams {
        let [aspect_w, aspect_h] = self.layout.target_aspect;
        let [min, max] = self.layout.aspect_range;
        let [sticker_w, sticker_h] = self.sizes.sticker;
        LayoutParams {
            allowed_counts: self.layout.allowed_counts.clone(),
            target_aspect: aspect_w as f64 / aspect_h as f64,
            aspect_range: AspectRange { min, max },
            native_tile: self
                .layout
                .prefer_native_tiles
                .then_some((sticker_w, sticker_h)),
        }
    }

    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.background.threshold)
    }
}

/// Output sizes as `[width, height]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizesConfig {
    /// Size of every per-tile sticker image.
    pub sticker: [u32; 2],
    /// Size of the main icon (first tile).
    pub main: [u32; 2],
    /// Size of the tab icon (first tile).
    pub tab: [u32; 2],
}

impl Default for SizesConfig {
    fn default() -> Self {
        Self {
            sticker: [370, 320],
            main: [240, 240],
            tab: [96, 74],
        }
    }
}

/// Grid detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Tile counts a sheet may contain, tried in this order.
    pub allowed_counts: Vec<u32>,
    /// Preferred tile aspect as `[width, height]`.
    pub target_aspect: [u32; 2],
    /// Accepted tile aspect ratios as `[min, max]`, inclusive.
    pub aspect_range: [f64; 2],
    /// Among equally scored layouts, prefer the one whose tiles are exactly
    /// `sizes.sticker`.
    pub prefer_native_tiles: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            allowed_counts: vec![8, 16, 24, 32, 40],
            target_aspect: [370, 320],
            aspect_range: [0.8, 1.4],
            prefer_native_tiles: true,
        }
    }
}

/// Background removal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    /// Strip the background by default (CLI flags override).
    pub remove: bool,
    /// Euclidean RGB distance below which a pixel counts as background.
    pub threshold: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            remove: false,
            threshold: 30.0,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel tile workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StickerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StickerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StickerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<StickerConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        log::info!("Loaded config from {}", path.display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Sticker Slicer Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Save as stickers.toml in the working directory, or pass --config <file>.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output sizes, as [width, height] in pixels
# ---------------------------------------------------------------------------
[sizes]
# Every tile is resampled to this size (01.png, 02.png, ...).
sticker = [370, 320]

# The first tile, resampled for the package's main icon (main.png).
main = [240, 240]

# The first tile, resampled for the small tab icon (tab.png).
tab = [96, 74]

# ---------------------------------------------------------------------------
# Grid detection
# ---------------------------------------------------------------------------
[layout]
# Number of tiles a sheet may contain (1 to 1024). Order matters: when two layouts
# score exactly the same, the one from the earlier count wins.
allowed_counts = [8, 16, 24, 32, 40]

# Preferred tile aspect as [width, height]. The layout whose tiles are
# closest to this aspect wins.
target_aspect = [370, 320]

# Tile aspect ratios (width / height) outside [min, max] are rejected.
aspect_range = [0.8, 1.4]

# When layouts tie exactly, prefer the one whose tiles are already
# exactly sizes.sticker.
prefer_native_tiles = true

# ---------------------------------------------------------------------------
# Background removal
# ---------------------------------------------------------------------------
[background]
# Make the flat background transparent in every output image.
# The background color is sampled from each output's top-left pixel.
remove = false

# Pixels closer than this (Euclidean RGB distance) to the sampled color
# become transparent.
threshold = 30.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel tile workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_sizes() {
        let config = StickerConfig::default();
        assert_eq!(config.sizes.sticker, [370, 320]);
        assert_eq!(config.sizes.main, [240, 240]);
        assert_eq!(config.sizes.tab, [96, 74]);
    }

    #[test]
    fn default_config_layout() {
        let config = StickerConfig::default();
        assert_eq!(config.layout.allowed_counts, vec![8, 16, 24, 32, 40]);
        assert_eq!(config.layout.target_aspect, [370, 320]);
        assert_eq!(config.layout.aspect_range, [0.8, 1.4]);
        assert!(config.layout.prefer_native_tiles);
    }

    #[test]
    fn default_config_background() {
        let config = StickerConfig::default();
        assert!(!config.background.remove);
        assert_eq!(config.background.threshold, 30.0);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
[background]
remove = true
"#;
        let config: StickerConfig = toml::from_str(toml_str).unwrap();
        assert!(config.background.remove);
        assert_eq!(config.background.threshold, 30.0);
        assert_eq!(config.sizes.sticker, [370, 320]);
    }

    // =========================================================================
    // Derived parameters
    // =========================================================================

    #[test]
    fn layout_params_from_defaults() {
        let params = StickerConfig::default().layout_params();
        assert_eq!(params.allowed_counts, vec![8, 16, 24, 32, 40]);
        assert_eq!(params.target_aspect, 1.15625);
        assert_eq!(params.aspect_range, AspectRange { min: 0.8, max: 1.4 });
        assert_eq!(params.native_tile, Some((370, 320)));
    }

    #[test]
    fn layout_params_without_native_preference() {
        let mut config = StickerConfig::default();
        config.layout.prefer_native_tiles = false;
        assert_eq!(config.layout_params().native_tile, None);
    }

    #[test]
    fn native_tile_follows_sticker_size() {
        let mut config = StickerConfig::default();
        config.sizes.sticker = [320, 320];
        assert_eq!(config.layout_params().native_tile, Some((320, 320)));
    }

    #[test]
    fn threshold_from_config() {
        let mut config = StickerConfig::default();
        config.background.threshold = 12.5;
        assert_eq!(config.threshold().value(), 12.5);
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn default_processing_config() {
        let config = ProcessingConfig::default();
        assert!(config.max_processes.is_none());
    }

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let threads = effective_threads(&config);
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_replaces_arrays_wholesale() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[layout]
allowed_counts = [16]
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let layout = merged.get("layout").unwrap();
        assert_eq!(
            layout.get("allowed_counts").unwrap().as_array().unwrap().len(),
            1
        );
        // Sibling keys survive
        assert!(layout.get("target_aspect").is_some());
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[background]
treshold = 20.0
"#;
        let result: Result<StickerConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[size]
sticker = [370, 320]
"#;
        let result: Result<StickerConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(StickerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_size() {
        let mut config = StickerConfig::default();
        config.sizes.tab = [0, 74];
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("sizes.tab"));
    }

    #[test]
    fn validate_empty_counts() {
        let mut config = StickerConfig::default();
        config.layout.allowed_counts.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_count() {
        let mut config = StickerConfig::default();
        config.layout.allowed_counts = vec![8, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_oversized_count() {
        let mut config = StickerConfig::default();
        config.layout.allowed_counts = vec![8, 4_000_000_000];
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("4000000000"));
        assert!(err.contains("1024"));
    }

    #[test]
    fn validate_max_count_ok() {
        let mut config = StickerConfig::default();
        config.layout.allowed_counts = vec![MAX_TILE_COUNT];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_zero_aspect() {
        let mut config = StickerConfig::default();
        config.layout.target_aspect = [370, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_inverted_aspect_range() {
        let mut config = StickerConfig::default();
        config.layout.aspect_range = [1.4, 0.8];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_negative_threshold() {
        let mut config = StickerConfig::default();
        config.background.threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_threshold_ok() {
        let mut config = StickerConfig::default();
        config.background.threshold = 0.0;
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // Loading tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("stickers.toml")).unwrap();
        assert_eq!(config.sizes.sticker, [370, 320]);
        assert_eq!(config.layout.allowed_counts, vec![8, 16, 24, 32, 40]);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stickers.toml");
        fs::write(
            &path,
            r#"
[sizes]
sticker = [320, 320]

[background]
remove = true
threshold = 12.0
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sizes.sticker, [320, 320]);
        assert_eq!(config.sizes.main, [240, 240]);
        assert!(config.background.remove);
        assert_eq!(config.background.threshold, 12.0);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stickers.toml");
        fs::write(&path, "[sizes\nsticker = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stickers.toml");
        fs::write(
            &path,
            r#"
[layout]
aspect_range = [2.0, 1.0]
"#,
        )
        .unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join("missing.toml")).unwrap().is_none());
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let _: toml::Value = toml::from_str(stock_config_toml()).unwrap();
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: StickerConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = StickerConfig::default();
        assert_eq!(config.sizes.sticker, defaults.sizes.sticker);
        assert_eq!(config.sizes.main, defaults.sizes.main);
        assert_eq!(config.sizes.tab, defaults.sizes.tab);
        assert_eq!(config.layout.allowed_counts, defaults.layout.allowed_counts);
        assert_eq!(config.layout.target_aspect, defaults.layout.target_aspect);
        assert_eq!(config.layout.aspect_range, defaults.layout.aspect_range);
        assert_eq!(config.background.threshold, defaults.background.threshold);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        for section in ["sizes", "layout", "background", "processing"] {
            assert!(value.get(section).is_some(), "missing [{section}]");
        }
    }
}
