//! Service layer keeping I/O and reporting out of the pixel logic

pub mod format;
pub mod io;
pub mod progress;

pub use format::{OutputFormatHandler, OUTPUT_SUFFIX};
pub use io::ImageIOService;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressTracker, ProgressUpdate,
};
