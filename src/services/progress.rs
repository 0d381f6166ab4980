//! Progress reporting service
//!
//! This module separates progress reporting concerns from the pipeline,
//! allowing different frontends to implement their own progress handling.

use crate::types::ProcessingTimings;
use instant::Instant;

/// Progress stages during a transparency pass
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStage {
    /// Loading and decoding input image
    ImageLoading,
    /// Computing mean brightness and picking the background type
    Classification,
    /// Rewriting background pixels
    Mapping,
    /// Saving result to file
    FileSaving,
    /// Processing completed
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::ImageLoading => "Loading input image",
            ProcessingStage::Classification => "Detecting background type",
            ProcessingStage::Mapping => "Making background transparent",
            ProcessingStage::FileSaving => "Saving result",
            ProcessingStage::Completed => "Processing completed",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::ImageLoading => 10,
            ProcessingStage::Classification => 40,
            ProcessingStage::Mapping => 70,
            ProcessingStage::FileSaving => 90,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during a transparency pass
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report processing completion with final timings
    fn report_completion(&self, timings: &ProcessingTimings);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Console progress reporter that logs progress through `log`
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// `verbose` adds elapsed times and a per-stage timing breakdown.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::debug!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::debug!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, timings: &ProcessingTimings) {
        log::debug!("Transparency pass completed in {}ms", timings.total_ms);

        if self.verbose {
            log::debug!("  • Image decode: {}ms", timings.image_decode_ms);
            log::debug!("  • Classification: {}ms", timings.classification_ms);
            log::debug!("  • Mapping: {}ms", timings.mapping_ms);
            if let Some(encode_ms) = timings.image_encode_ms {
                log::debug!("  • Image encode: {}ms", encode_ms);
            }
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::error!("Error during {}: {}", stage.description(), error);
    }
}

/// Progress tracker that manages timing and progress reporting
pub struct ProgressTracker {
    reporter: Box<dyn ProgressReporter>,
    start_time: Instant,
    current_stage: Option<ProcessingStage>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
            current_stage: None,
        }
    }

    /// Create a progress tracker with no-op reporter
    #[must_use]
    pub fn no_op() -> Self {
        Self::new(Box::new(NoOpProgressReporter))
    }

    /// Start timing a new image; elapsed times in updates count from here
    pub fn restart(&mut self) {
        self.start_time = Instant::now();
        self.current_stage = None;
    }

    /// Report progress for a specific stage
    pub fn report_stage(&mut self, stage: ProcessingStage) {
        self.current_stage = Some(stage.clone());
        let update = ProgressUpdate::new(stage, self.start_time);
        self.reporter.report_progress(update);
    }

    pub fn report_completion(&self, timings: &ProcessingTimings) {
        self.reporter.report_completion(timings);
    }

    /// Report an error against the most recent stage
    pub fn report_error(&self, error: &str) {
        let stage = self
            .current_stage
            .clone()
            .unwrap_or(ProcessingStage::ImageLoading);
        self.reporter.report_error(stage, error);
    }

    #[must_use]
    pub fn current_stage(&self) -> Option<&ProcessingStage> {
        self.current_stage.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct TestProgressReporter {
        updates: Arc<Mutex<Vec<ProgressUpdate>>>,
        completions: Arc<Mutex<Vec<ProcessingTimings>>>,
        errors: Arc<Mutex<Vec<(ProcessingStage, String)>>>,
    }

    impl ProgressReporter for TestProgressReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }

        fn report_completion(&self, timings: &ProcessingTimings) {
            self.completions.lock().unwrap().push(timings.clone());
        }

        fn report_error(&self, stage: ProcessingStage, error: &str) {
            self.errors.lock().unwrap().push((stage, error.to_string()));
        }
    }

    #[test]
    fn test_processing_stage_progress_increases() {
        let stages = [
            ProcessingStage::ImageLoading,
            ProcessingStage::Classification,
            ProcessingStage::Mapping,
            ProcessingStage::FileSaving,
            ProcessingStage::Completed,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].progress_percentage() < pair[1].progress_percentage());
        }
        assert_eq!(ProcessingStage::Completed.progress_percentage(), 100);
    }

    #[test]
    fn test_progress_tracker() {
        let reporter = TestProgressReporter::default();
        let updates = Arc::clone(&reporter.updates);
        let completions = Arc::clone(&reporter.completions);
        let errors = Arc::clone(&reporter.errors);

        let mut tracker = ProgressTracker::new(Box::new(reporter));
        assert!(tracker.current_stage().is_none());

        tracker.report_stage(ProcessingStage::Classification);
        tracker.report_stage(ProcessingStage::Mapping);
        assert_eq!(tracker.current_stage(), Some(&ProcessingStage::Mapping));

        tracker.report_error("boom");
        tracker.report_completion(&ProcessingTimings::default());

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].description, "Detecting background type");
        assert_eq!(updates[1].progress, 70);

        let errors = errors.lock().unwrap();
        assert_eq!(errors.as_slice(), &[(ProcessingStage::Mapping, "boom".to_string())]);
        assert_eq!(completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_restart_resets_stage_and_clock() {
        let reporter = TestProgressReporter::default();
        let updates = Arc::clone(&reporter.updates);

        let mut tracker = ProgressTracker::new(Box::new(reporter));
        tracker.report_stage(ProcessingStage::FileSaving);
        std::thread::sleep(std::time::Duration::from_millis(30));

        tracker.restart();
        assert!(tracker.current_stage().is_none());
        tracker.report_stage(ProcessingStage::ImageLoading);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        // The second image's clock starts from the restart, not from construction
        assert!(updates[1].elapsed_ms < 30);
    }
}
