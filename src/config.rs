//! Configuration module.
//!
//! Handles loading, validating, and merging `logocraft.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of keys on top.
//!
//! ## Config File Location
//!
//! `logocraft.toml` in the working directory is picked up automatically.
//! `--config <FILE>` points at an explicit file instead (which must exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [validation]
//! min_dimension = 90          # Smallest accepted side, px
//! max_dimension = 5000        # Largest accepted side, px
//! max_file_size = 52428800    # Bytes (50 MiB)
//!
//! [removal]
//! method = "combined"         # combined | contour_detection | threshold | chroma_key | grab_cut | neural_network
//! white_threshold = 240       # Border brightness counted as white (0-255)
//! white_coverage = 0.9        # Fraction of white border needed before removing
//! grabcut_iterations = 5
//!
//! [resize]
//! progressive_downscale = true
//!
//! [output]
//! compression = "best"        # fast | default | best
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//!
//! [logging]
//! level = "info"              # trace | debug | info | warn | error | off
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [removal]
//! method = "chroma_key"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::imaging::PngCompression;
use crate::removal::{
    BackgroundRemover, DEFAULT_GRABCUT_ITERATIONS, DEFAULT_WHITE_COVERAGE,
    DEFAULT_WHITE_THRESHOLD, RemovalMethod,
};
use crate::validate::{
    DEFAULT_MAX_DIMENSION, DEFAULT_MAX_FILE_SIZE, DEFAULT_MIN_DIMENSION, ValidationLimits,
};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "logocraft.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `logocraft.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogocraftConfig {
    /// Source image bounds.
    pub validation: ValidationConfig,
    /// Background-removal strategy and gate thresholds.
    pub removal: RemovalConfig,
    /// Canvas-fit resampling settings.
    pub resize: ResizeConfig,
    /// Final PNG encoding.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Log verbosity.
    pub logging: LoggingConfig,
}

impl LogocraftConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.validation;
        if v.min_dimension == 0 {
            return Err(ConfigError::Validation(
                "validation.min_dimension must be non-zero".into(),
            ));
        }
        if v.min_dimension > v.max_dimension {
            return Err(ConfigError::Validation(format!(
                "validation.min_dimension ({}) must not exceed validation.max_dimension ({})",
                v.min_dimension, v.max_dimension
            )));
        }
        let coverage = self.removal.white_coverage;
        if !(coverage > 0.0 && coverage <= 1.0) {
            return Err(ConfigError::Validation(
                "removal.white_coverage must be in (0, 1]".into(),
            ));
        }
        if self.removal.grabcut_iterations == 0 {
            return Err(ConfigError::Validation(
                "removal.grabcut_iterations must be at least 1".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Source image bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub min_dimension: u32,
    pub max_dimension: u32,
    /// Bytes.
    pub max_file_size: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_dimension: DEFAULT_MIN_DIMENSION,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ValidationConfig {
    pub fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            min_dimension: self.min_dimension,
            max_dimension: self.max_dimension,
            max_file_size: self.max_file_size,
        }
    }
}

/// Background-removal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemovalConfig {
    pub method: RemovalMethod,
    /// Border brightness (0-255) that counts as white.
    pub white_threshold: u8,
    /// Fraction of white border pixels required before removing anything.
    pub white_coverage: f64,
    pub grabcut_iterations: u32,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            method: RemovalMethod::default(),
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            white_coverage: DEFAULT_WHITE_COVERAGE,
            grabcut_iterations: DEFAULT_GRABCUT_ITERATIONS,
        }
    }
}

impl RemovalConfig {
    /// Build a remover from these settings.
    pub fn remover(&self) -> BackgroundRemover {
        BackgroundRemover::new(self.method)
            .with_gate(self.white_threshold, self.white_coverage)
            .with_grabcut_iterations(self.grabcut_iterations)
    }
}

/// Canvas-fit resampling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Box pre-shrink before Lanczos when shrinking below half size.
    pub progressive_downscale: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            progressive_downscale: true,
        }
    }
}

/// Final PNG encoding settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub compression: PngCompression,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel format workers.
    /// When absent or null, defaults to the number of CPU cores.
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

/// Log verbosity. `RUST_LOG`, when set, takes precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(LogocraftConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load `logocraft.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `logocraft.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_toml(&config_path).map(Some)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<LogocraftConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: LogocraftConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `logocraft.toml` in the given directory, falling back to
/// stock defaults when there is none.
pub fn load_config(dir: &Path) -> Result<LogocraftConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<LogocraftConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, Some(read_toml(path)?))
}

/// Returns a fully-commented stock `logocraft.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# logocraft Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# logocraft reads ./logocraft.toml automatically, or the file given with
# --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Source validation
# ---------------------------------------------------------------------------
[validation]
# Smallest and largest accepted side, in pixels.
min_dimension = 90
max_dimension = 5000

# Largest accepted source file, in bytes (50 MiB).
max_file_size = 52428800

# ---------------------------------------------------------------------------
# Background removal
# ---------------------------------------------------------------------------
[removal]
# Strategy used when background removal is requested:
#   combined          contour + threshold masks, cleaned up (best for flat logos)
#   contour_detection edge contours only
#   threshold         automatic (Otsu) threshold only
#   chroma_key        key out a near-white band
#   grab_cut          colour-model segmentation for busy backgrounds
#   neural_network    external segmentation model (library use only)
method = "combined"

# A border pixel at or above this brightness (0-255) counts as white.
white_threshold = 240

# Fraction of white border pixels required before anything is removed.
# Images below it are kept fully opaque.
white_coverage = 0.9

# Refinement rounds for grab_cut.
grabcut_iterations = 5

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# Shrink in two steps (box filter to ~0.707x, then Lanczos) when the
# scale factor is below 0.5. Reduces aliasing on large sources.
progressive_downscale = true

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# PNG compression effort: fast | default | best
compression = "best"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel format workers for --parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# trace | debug | info | warn | error | off  (RUST_LOG overrides this)
level = "info"
"##
}
