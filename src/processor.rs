//! Background transparency processor
//!
//! `BackgroundTransparencyProcessor` runs the whole pipeline: load, classify,
//! map, save. Both the library entry points and the CLI go through it so
//! they behave the same.

use crate::{
    classifier::{classify_brightness, mean_brightness, BackgroundType},
    config::TransparencyConfig,
    error::Result,
    mapper::apply_transparency_in_place,
    services::{ImageIOService, ProcessingStage, ProgressReporter, ProgressTracker},
    types::{ProcessingMetadata, ProcessingTimings, TransparencyResult},
};
use image::{DynamicImage, RgbaImage};
use instant::Instant;
use std::path::Path;
use tracing::{debug, info, instrument, span, Level};

/// Runs the load → classify → map → save pipeline for one configuration
pub struct BackgroundTransparencyProcessor {
    config: TransparencyConfig,
    progress: ProgressTracker,
}

impl BackgroundTransparencyProcessor {
    /// Create a processor with a validated configuration
    pub fn new(config: TransparencyConfig) -> Result<Self> {
        Self::with_reporter(config, ProgressTracker::no_op())
    }

    /// Create a processor that reports stage progress to `reporter`
    pub fn with_progress_reporter(
        config: TransparencyConfig,
        reporter: Box<dyn ProgressReporter>,
    ) -> Result<Self> {
        Self::with_reporter(config, ProgressTracker::new(reporter))
    }

    fn with_reporter(config: TransparencyConfig, progress: ProgressTracker) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, progress })
    }

    #[must_use]
    pub fn config(&self) -> &TransparencyConfig {
        &self.config
    }

    /// Pick the background type for `image`
    ///
    /// Returns the mean brightness alongside when the classifier ran.
    pub fn detect_background(&self, image: &RgbaImage) -> (BackgroundType, Option<f64>) {
        match self.config.background.forced() {
            Some(forced) => (forced, None),
            None => {
                let mean = mean_brightness(image);
                (classify_brightness(mean, self.config.threshold), Some(mean))
            },
        }
    }

    /// Make the background of a decoded image transparent
    ///
    /// The image is converted to RGBA8 first; sources without alpha become
    /// fully opaque.
    #[instrument(
        skip(self, image),
        fields(dimensions = %format!("{}x{}", image.width(), image.height()))
    )]
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<TransparencyResult> {
        self.progress.restart();
        self.process_rgba(image.to_rgba8(), ProcessingTimings::default())
    }

    fn process_rgba(
        &mut self,
        mut rgba: RgbaImage,
        mut timings: ProcessingTimings,
    ) -> Result<TransparencyResult> {
        let start = Instant::now();

        self.progress.report_stage(ProcessingStage::Classification);
        let (background, mean) = {
            let _span = span!(Level::DEBUG, "classification", threshold = %self.config.threshold)
                .entered();
            let classify_start = Instant::now();
            let detected = self.detect_background(&rgba);
            timings.classification_ms = classify_start.elapsed().as_millis() as u64;
            detected
        };

        if let Some(mean) = mean {
            debug!(mean_brightness = %mean, threshold = %self.config.threshold, "Computed mean brightness");
        }
        info!("Detected background type: {}", background);

        self.progress.report_stage(ProcessingStage::Mapping);
        let stats = {
            let _span = span!(Level::DEBUG, "mapping", background = %background).entered();
            let map_start = Instant::now();
            let stats = apply_transparency_in_place(&mut rgba, background, self.config.tolerances());
            timings.mapping_ms = map_start.elapsed().as_millis() as u64;
            stats
        };

        debug!(
            transparent_pixels = %stats.transparent_pixels,
            total_pixels = %stats.total_pixels,
            "Mapped background pixels"
        );

        timings.total_ms += start.elapsed().as_millis() as u64;

        Ok(TransparencyResult::new(
            rgba,
            background,
            ProcessingMetadata {
                mean_brightness: mean,
                stats,
                timings,
            },
        ))
    }

    /// Run the full pipeline from `input_path` to `output_path`
    ///
    /// Nothing is written if loading or decoding fails. An existing file at
    /// `output_path` is replaced.
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input_path: P,
        output_path: Q,
    ) -> Result<TransparencyResult> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        let total_start = Instant::now();
        self.progress.restart();

        let _span = span!(
            Level::INFO,
            "file_processing",
            input = %input_path.display(),
            output = %output_path.display()
        )
        .entered();

        self.progress.report_stage(ProcessingStage::ImageLoading);
        let decode_start = Instant::now();
        let rgba = match ImageIOService::load_rgba(input_path) {
            Ok(rgba) => rgba,
            Err(e) => {
                self.progress.report_error(&e.to_string());
                return Err(e);
            },
        };
        let timings = ProcessingTimings {
            image_decode_ms: decode_start.elapsed().as_millis() as u64,
            ..ProcessingTimings::default()
        };

        let mut result = self.process_rgba(rgba, timings)?;

        self.progress.report_stage(ProcessingStage::FileSaving);
        let encode_start = Instant::now();
        if let Err(e) = result.save(output_path, self.config.output_format) {
            self.progress.report_error(&e.to_string());
            return Err(e);
        }
        result.metadata.timings.image_encode_ms = Some(encode_start.elapsed().as_millis() as u64);
        result.metadata.timings.total_ms = total_start.elapsed().as_millis() as u64;

        info!(
            "Image saved with transparent background at {}",
            output_path.display()
        );

        self.progress.report_stage(ProcessingStage::Completed);
        self.progress.report_completion(&result.metadata.timings);

        Ok(result)
    }
}
