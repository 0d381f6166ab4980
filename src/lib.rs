#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # bgclear
//!
//! Turns a uniform light or dark image background transparent.
//!
//! The pipeline has two stages:
//!
//! - **Background classification**: the mean BT.601 luma of the image is
//!   compared with a threshold (default 128). Ties count as light.
//! - **Transparency mapping**: every pixel close enough to white (light
//!   background) or black (dark background) becomes fully transparent.
//!   Everything else is left as it was.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgclear::{make_background_transparent, TransparencyConfig};
//!
//! # fn example() -> bgclear::Result<()> {
//! let config = TransparencyConfig::builder()
//!     .light_tolerance(120)
//!     .dark_tolerance(40)
//!     .build()?;
//! let result = make_background_transparent("logo.jpg", "logo.png", &config)?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Working on pixels directly
//!
//! ```rust
//! use bgclear::{apply_transparency, classify_background, BackgroundType, Tolerances};
//! use image::{Rgba, RgbaImage};
//!
//! let image = RgbaImage::from_pixel(2, 2, Rgba([250, 250, 250, 255]));
//! let background = classify_background(&image, 128);
//! assert_eq!(background, BackgroundType::Light);
//!
//! let output = apply_transparency(&image, background, Tolerances::default());
//! assert!(output.pixels().all(|p| p[3] == 0));
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): command-line interface, tracing subscriber setup
//!   (console, compact or JSON output) and batch processing
//! - `webp-support`: WebP input decoding

pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod mapper;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use std::path::Path;

// Public API exports
pub use classifier::{classify_background, luminance, mean_brightness, BackgroundType};
pub use config::{BackgroundMode, OutputFormat, TransparencyConfig, TransparencyConfigBuilder};
pub use error::{BgClearError, Result};
pub use mapper::{
    apply_transparency, apply_transparency_in_place, MappingStats, Tolerances, MAX_LIGHT_TOLERANCE,
};
pub use processor::BackgroundTransparencyProcessor;
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, OutputFormatHandler,
    ProcessingStage, ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use types::{ProcessingMetadata, ProcessingTimings, TransparencyResult};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Make the background of the image at `input_path` transparent and save it
///
/// Loads the image, classifies its background (unless the configuration
/// forces one), maps background pixels to transparent and writes the result
/// to `output_path`, replacing any existing file.
///
/// # Errors
///
/// - [`BgClearError::InputNotFound`] if `input_path` does not exist
/// - [`BgClearError::Decode`] if it is not a decodable image
/// - [`BgClearError::Write`] if the output cannot be written
/// - [`BgClearError::InvalidConfig`] if `config` fails validation
pub fn make_background_transparent<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    config: &TransparencyConfig,
) -> Result<TransparencyResult> {
    let mut processor = BackgroundTransparencyProcessor::new(config.clone())?;
    processor.process_file(input_path, output_path)
}

/// Make the background of an in-memory image transparent
pub fn remove_background_from_image(
    image: &image::DynamicImage,
    config: &TransparencyConfig,
) -> Result<TransparencyResult> {
    let mut processor = BackgroundTransparencyProcessor::new(config.clone())?;
    processor.process_image(image)
}

/// Decode `image_bytes` and make the background transparent
///
/// ```rust
/// use bgclear::{remove_background_from_bytes, OutputFormat, TransparencyConfig};
///
/// # fn example(upload: Vec<u8>) -> bgclear::Result<Vec<u8>> {
/// let result = remove_background_from_bytes(&upload, &TransparencyConfig::default())?;
/// result.to_bytes(OutputFormat::Png)
/// # }
/// ```
pub fn remove_background_from_bytes(
    image_bytes: &[u8],
    config: &TransparencyConfig,
) -> Result<TransparencyResult> {
    let image = ImageIOService::load_from_bytes(image_bytes)?;
    remove_background_from_image(&image, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn test_remove_background_from_bytes() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let result =
            remove_background_from_bytes(bytes.get_ref(), &TransparencyConfig::default()).unwrap();
        assert_eq!(result.background, BackgroundType::Dark);
        assert!(result.image.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_remove_background_from_bytes_rejects_garbage() {
        let result = remove_background_from_bytes(b"nope", &TransparencyConfig::default());
        assert!(matches!(result, Err(BgClearError::Decode { .. })));
    }
}
