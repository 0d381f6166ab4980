//! Configuration types for background transparency operations

use crate::classifier::BackgroundType;
use crate::error::{BgClearError, Result};
use crate::mapper::{Tolerances, MAX_LIGHT_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the background type is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Classify each image by its mean brightness
    #[default]
    Auto,
    /// Treat every image as having a light background
    Light,
    /// Treat every image as having a dark background
    Dark,
}

impl BackgroundMode {
    /// Forced background type, if any
    #[must_use]
    pub fn forced(self) -> Option<BackgroundType> {
        match self {
            Self::Auto => None,
            Self::Light => Some(BackgroundType::Light),
            Self::Dark => Some(BackgroundType::Dark),
        }
    }
}

impl std::fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Output image format options
///
/// Only lossless encoders that keep the alpha channel are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    #[default]
    Png,
    /// TIFF with alpha channel transparency and lossless compression
    Tiff,
}

impl OutputFormat {
    #[must_use]
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }
}

/// Configuration for background transparency operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransparencyConfig {
    /// Mean brightness at or above which a background is light (0-255)
    pub threshold: u8,

    /// Maximum summed distance from white for light backgrounds (0-765)
    pub light_tolerance: u16,

    /// Maximum average brightness for dark backgrounds (0-255)
    pub dark_tolerance: u8,

    /// Background selection mode
    pub background: BackgroundMode,

    /// Output format
    pub output_format: OutputFormat,
}

impl Default for TransparencyConfig {
    fn default() -> Self {
        Self {
            threshold: 128,
            light_tolerance: 200,
            dark_tolerance: 50,
            background: BackgroundMode::Auto,
            output_format: OutputFormat::Png,
        }
    }
}

impl TransparencyConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bgclear::TransparencyConfig;
    ///
    /// let config = TransparencyConfig::builder()
    ///     .threshold(100)
    ///     .light_tolerance(30)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.dark_tolerance, 50);
    /// ```
    #[must_use]
    pub fn builder() -> TransparencyConfigBuilder {
        TransparencyConfigBuilder::default()
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The result is validated.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|e| {
            BgClearError::invalid_config(format!(
                "Failed to read config file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            BgClearError::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    ///
    /// `threshold` and `dark_tolerance` are bounded by their `u8` type; only
    /// the light tolerance can leave its range.
    ///
    /// ```rust
    /// use bgclear::TransparencyConfig;
    ///
    /// let mut config = TransparencyConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.light_tolerance = 800;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.light_tolerance > MAX_LIGHT_TOLERANCE {
            return Err(BgClearError::config_value_error(
                "light tolerance",
                self.light_tolerance,
                "0-765",
                Some(200),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn tolerances(&self) -> Tolerances {
        Tolerances::new(self.light_tolerance, self.dark_tolerance)
    }
}

/// Builder for `TransparencyConfig`
#[derive(Debug, Default)]
pub struct TransparencyConfigBuilder {
    config: TransparencyConfig,
}

impl TransparencyConfigBuilder {
    #[must_use]
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the light tolerance; values are checked in [`Self::build`]
    #[must_use]
    pub fn light_tolerance(mut self, tolerance: u16) -> Self {
        self.config.light_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn dark_tolerance(mut self, tolerance: u8) -> Self {
        self.config.dark_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn background(mut self, mode: BackgroundMode) -> Self {
        self.config.background = mode;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<TransparencyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
