//! Image I/O operations service
//!
//! This module separates file I/O operations from the pixel logic,
//! making the classifier and mapper testable on in-memory buffers.

use crate::{
    config::OutputFormat,
    error::{BgClearError, Result},
};
use image::{DynamicImage, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// # Returns
    /// * `Ok(DynamicImage)` - Successfully loaded image
    /// * `Err(BgClearError::InputNotFound)` - Path does not exist
    /// * `Err(BgClearError::Decode)` - File is not a decodable raster image
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgclear::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgClearError::input_not_found(path_ref));
        }

        // First try to load the image using extension-based format detection
        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref)
                    .map_err(|io_err| BgClearError::decode_error(path_ref, io_err))?;

                image::load_from_memory(&data).map_err(|content_err| {
                    let extension = path_ref
                        .extension()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown");
                    BgClearError::decode_error(
                        path_ref,
                        format!(
                            "extension-based ({}) and content-based detection both failed. Extension error: {}. Content error: {}",
                            extension, e, content_err
                        ),
                    )
                })
            },
        }
    }

    /// Load an image and force an RGBA8 representation
    ///
    /// Sources without an alpha channel get a fully opaque one.
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        Self::load_image(path).map(|img| img.to_rgba8())
    }

    /// Decode an image held in memory
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| BgClearError::decode_error("<memory>", e))
    }

    /// Save an RGBA image, replacing any existing file at `path`
    ///
    /// The image is encoded into a temporary file in the target directory
    /// and then renamed over `path`, so a failed encode never leaves a
    /// partial file behind. The target directory must already exist.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgclear::{services::ImageIOService, OutputFormat};
    /// use image::RgbaImage;
    ///
    /// let image = RgbaImage::new(100, 100);
    /// ImageIOService::save_image(&image, "output.png", OutputFormat::Png)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_image<P: AsRef<Path>>(
        image: &RgbaImage,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path_ref = path.as_ref();
        let parent = match path_ref.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".bgclear-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| BgClearError::write_error(path_ref, e))?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            image
                .write_to(&mut writer, format.image_format())
                .map_err(|e| BgClearError::write_error(path_ref, e))?;
            writer
                .flush()
                .map_err(|e| BgClearError::write_error(path_ref, e))?;
        }

        temp.persist(path_ref)
            .map_err(|e| BgClearError::write_error(path_ref, e.error))?;

        log::debug!("Wrote {:?} image to {}", format, path_ref.display());
        Ok(())
    }

    /// Check if a file has a supported input image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| {
                matches!(
                    ext.as_str(),
                    "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif" | "webp"
                )
            })
    }
}
