//! Run configuration.
//!
//! Handles loading, validating, and layering `config.toml`. Values are
//! resolved in three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  →  <source>/config.toml  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [pipeline]
//! max_pixel_diff_ratio = 40  # Max % the long side may exceed the short side
//! desired_dimension = 32     # Side length of the square output, in pixels (1-4096)
//!
//! [output]
//! quality = 75               # JPEG encoding quality (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    DEFAULT_DESIRED_DIMENSION, DEFAULT_MAX_PIXEL_DIFF_RATIO, MAX_DESIRED_DIMENSION,
    PipelineConfig, Quality,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the source root.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rejection threshold and output size.
    pub pipeline: PipelineSettings,
    /// Encoder settings for written files.
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Largest accepted difference between the long and short side, in
    /// percent of the short side. Images above it are skipped.
    pub max_pixel_diff_ratio: u32,
    /// Side length of the square grayscale output.
    pub desired_dimension: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_pixel_diff_ratio: DEFAULT_MAX_PIXEL_DIFF_RATIO,
            desired_dimension: DEFAULT_DESIRED_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            quality: u32::from(Quality::default().value()),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_DESIRED_DIMENSION).contains(&self.pipeline.desired_dimension) {
            return Err(ConfigError::Validation(format!(
                "pipeline.desired_dimension must be 1-{MAX_DESIRED_DIMENSION}"
            )));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_pixel_diff_ratio: self.pipeline.max_pixel_diff_ratio,
            desired_dimension: self.pipeline.desired_dimension,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub max_pixel_diff_ratio: Option<u32>,
    pub desired_dimension: Option<u32>,
    pub quality: Option<u32>,
}

impl ConfigOverrides {
    /// Sparse TOML table holding only the values that were set.
    pub fn to_toml(&self) -> Option<toml::Value> {
        let mut pipeline = toml::Table::new();
        if let Some(ratio) = self.max_pixel_diff_ratio {
            pipeline.insert("max_pixel_diff_ratio".into(), toml::Value::Integer(ratio.into()));
        }
        if let Some(size) = self.desired_dimension {
            pipeline.insert("desired_dimension".into(), toml::Value::Integer(size.into()));
        }
        let mut output = toml::Table::new();
        if let Some(quality) = self.quality {
            output.insert("quality".into(), toml::Value::Integer(quality.into()));
        }

        let mut root = toml::Table::new();
        if !pipeline.is_empty() {
            root.insert("pipeline".into(), toml::Value::Table(pipeline));
        }
        if !output.is_empty() {
            root.insert("output".into(), toml::Value::Table(output));
        }
        (!root.is_empty()).then_some(toml::Value::Table(root))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer every override is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge each present layer onto `base` in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    layers: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<Config, ConfigError> {
    let merged = layers.into_iter().flatten().fold(base, merge_toml);
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in `dir` (if any) over the stock defaults.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    load_config_with_overrides(dir, &ConfigOverrides::default())
}

/// Like [`load_config`], with command-line values applied last.
pub fn load_config_with_overrides(
    dir: &Path,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let file = load_raw_config(dir)?;
    resolve_config(base, [file, overrides.to_toml()])
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# squaregray configuration
# ========================
# Place this file in the source directory as config.toml.
# All settings are optional; values shown are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pipeline
# ---------------------------------------------------------------------------
[pipeline]
# Largest accepted difference between the long and short side, as a
# percentage of the short side. 140x100 is 40 (accepted), 141x100 is 41.
max_pixel_diff_ratio = 40

# Side length of the square grayscale output, in pixels (1-4096).
desired_dimension = 32

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG encoding quality (1 = worst, 100 = best).
quality = 75
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.pipeline.max_pixel_diff_ratio, 40);
        assert_eq!(config.pipeline.desired_dimension, 32);
        assert_eq!(config.output.quality, 75);
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn pipeline_config_mirrors_settings() {
        let mut config = Config::default();
        config.pipeline.max_pixel_diff_ratio = 10;
        config.pipeline.desired_dimension = 64;
        assert_eq!(
            config.pipeline_config(),
            PipelineConfig {
                max_pixel_diff_ratio: 10,
                desired_dimension: 64
            }
        );
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[pipeline]
desired_dimension = 64
"##;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.pipeline.desired_dimension, 64);
        assert_eq!(config.pipeline.max_pixel_diff_ratio, 40);
        assert_eq!(config.output.quality, 75);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r##"
[pipeline]
max_pixel_diff_ratio = 25

[output]
quality = 90
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.pipeline.max_pixel_diff_ratio, 25);
        assert_eq!(config.pipeline.desired_dimension, 32);
        assert_eq!(config.output.quality, 90);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[pipeline\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[pipeline]\nmax_pixel_diff = 10\n",
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<Config, _> = toml::from_str("[threads]\ncount = 4\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_zero_dimension() {
        let mut config = Config::default();
        config.pipeline.desired_dimension = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_dimension_upper_bound() {
        let mut config = Config::default();
        config.pipeline.desired_dimension = MAX_DESIRED_DIMENSION;
        assert!(config.validate().is_ok());
        config.pipeline.desired_dimension = MAX_DESIRED_DIMENSION + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.pipeline.desired_dimension = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = Config::default();
        config.output.quality = 0;
        assert!(config.validate().is_err());
        config.output.quality = 101;
        assert!(config.validate().is_err());
        config.output.quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[pipeline]\ndesired_dimension = 0\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Layering
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_nested_preserves_siblings() {
        let base: toml::Value = toml::from_str("[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 5").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(5));
    }

    #[test]
    fn empty_overrides_produce_no_layer() {
        assert_eq!(ConfigOverrides::default().to_toml(), None);
    }

    #[test]
    fn overrides_beat_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[pipeline]\nmax_pixel_diff_ratio = 25\ndesired_dimension = 48\n",
        )
        .unwrap();
        let overrides = ConfigOverrides {
            max_pixel_diff_ratio: Some(60),
            quality: Some(95),
            ..ConfigOverrides::default()
        };

        let config = load_config_with_overrides(tmp.path(), &overrides).unwrap();
        assert_eq!(config.pipeline.max_pixel_diff_ratio, 60);
        assert_eq!(config.pipeline.desired_dimension, 48);
        assert_eq!(config.output.quality, 95);
    }

    #[test]
    fn overrides_are_validated() {
        let tmp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            desired_dimension: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(load_config_with_overrides(tmp.path(), &overrides).is_err());

        let huge = ConfigOverrides {
            desired_dimension: Some(u32::MAX),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            load_config_with_overrides(tmp.path(), &huge),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, Config::default());
    }
}
