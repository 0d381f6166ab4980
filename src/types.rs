//! Result and metadata types

use crate::classifier::BackgroundType;
use crate::config::OutputFormat;
use crate::error::{BgClearError, Result};
use crate::mapper::MappingStats;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timing breakdown for one image, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Image loading and decoding from file
    pub image_decode_ms: u64,

    /// Mean brightness and background decision
    pub classification_ms: u64,

    /// Per-pixel transparency pass
    pub mapping_ms: u64,

    /// Final image encoding (if saving to file)
    pub image_encode_ms: Option<u64>,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

/// Facts gathered while processing an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Mean BT.601 luma of the input, `None` when the background was forced
    pub mean_brightness: Option<f64>,

    /// Pixel counts from the mapping pass
    pub stats: MappingStats,

    pub timings: ProcessingTimings,
}

/// Output of a transparency pass
#[derive(Debug, Clone)]
pub struct TransparencyResult {
    /// Output image, same dimensions and pixel order as the input
    pub image: RgbaImage,

    /// Background type the mapping was performed for
    pub background: BackgroundType,

    pub metadata: ProcessingMetadata,
}

impl TransparencyResult {
    #[must_use]
    pub fn new(image: RgbaImage, background: BackgroundType, metadata: ProcessingMetadata) -> Self {
        Self {
            image,
            background,
            metadata,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }

    /// Fraction of pixels made transparent
    #[must_use]
    pub fn transparent_ratio(&self) -> f64 {
        self.metadata.stats.transparent_ratio()
    }

    /// Save as PNG, replacing any existing file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(path, OutputFormat::Png)
    }

    /// Save in the given format, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<()> {
        crate::services::ImageIOService::save_image(&self.image, path, format)
    }

    /// Encode into an in-memory buffer
    pub fn to_bytes(&self, format: OutputFormat) -> Result<Vec<u8>> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, format.image_format())
            .map_err(|e| BgClearError::write_error("<memory>", e))?;
        Ok(buffer.into_inner())
    }

    /// One-line human summary of the result
    #[must_use]
    pub fn summary(&self) -> String {
        let (width, height) = self.dimensions();
        format!(
            "{}x{} {} background, {}/{} pixels transparent ({:.1}%) in {}ms",
            width,
            height,
            self.background,
            self.metadata.stats.transparent_pixels,
            self.metadata.stats.total_pixels,
            self.transparent_ratio() * 100.0,
            self.metadata.timings.total_ms
        )
    }
}
