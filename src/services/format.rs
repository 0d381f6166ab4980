//! Output format handling service

use crate::config::OutputFormat;
use std::path::{Path, PathBuf};

/// Suffix appended to input file stems when deriving output names
pub const OUTPUT_SUFFIX: &str = "_transparent";

/// Service for output naming and format details
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Get the file extension for a given output format (without the dot)
    ///
    /// ```rust
    /// use bgclear::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Tiff), "tiff");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Guess an output format from a path's extension
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<OutputFormat> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    /// Output path for `input` inside `output_dir`, or beside the input
    ///
    /// `photo.jpg` becomes `photo_transparent.png` for PNG output.
    #[must_use]
    pub fn derive_output_path(
        input: &Path,
        output_dir: Option<&Path>,
        format: OutputFormat,
    ) -> PathBuf {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
        let file_name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, Self::get_extension(format));

        match output_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }
}
