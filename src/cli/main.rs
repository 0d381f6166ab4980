//! bgclear CLI
//!
//! Command-line interface that makes uniform light or dark backgrounds
//! transparent, one file at a time or over whole directories.

use super::config::CliConfigBuilder;
use crate::{
    config::TransparencyConfig,
    processor::BackgroundTransparencyProcessor,
    services::{ConsoleProgressReporter, ImageIOService, OutputFormatHandler, OUTPUT_SUFFIX},
    tracing_config::{events, init_cli_tracing, spans},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Make uniform image backgrounds transparent
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgclear")]
pub struct Cli {
    /// Input image files or directories
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<String>,

    /// Output file (single input) or directory (batch processing)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Output format [default: png, or inferred from the output extension]
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Mean brightness at or above which the background counts as light [default: 128]
    #[arg(long, value_name = "0-255")]
    pub threshold: Option<u8>,

    /// Maximum summed distance from white treated as background [default: 200]
    #[arg(long, value_name = "0-765", value_parser = clap::value_parser!(u16).range(0..=765))]
    pub light_tolerance: Option<u16>,

    /// Maximum average brightness treated as background [default: 50]
    #[arg(long, value_name = "0-255")]
    pub dark_tolerance: Option<u8>,

    /// Background type: detect automatically or force one [default: auto]
    #[arg(short, long, value_enum)]
    pub background: Option<CliBackgroundMode>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// File name pattern for directory inputs (e.g., "*.jpg"); files whose
    /// name ends in "_transparent" are skipped as previous outputs
    #[arg(long)]
    pub pattern: Option<String>,

    /// Show a progress bar for batch processing
    #[arg(long)]
    pub progress: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Tiff,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliBackgroundMode {
    Auto,
    Light,
    Dark,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored human-readable lines
    Console,
    /// Plain lines without colors, for CI logs
    Compact,
    /// One JSON object per line
    Json,
}

/// One file selected for batch processing
#[derive(Debug, Clone, PartialEq, Eq)]
struct BatchInput {
    path: PathBuf,
    /// Directory of `path` relative to the scanned input directory, empty
    /// for files named on the command line
    relative_dir: PathBuf,
}

impl BatchInput {
    fn explicit(path: PathBuf) -> Self {
        Self {
            path,
            relative_dir: PathBuf::new(),
        }
    }

    /// Output location, mirroring the scanned directory layout under
    /// `output_dir`
    fn output_path(&self, output_dir: Option<&Path>, config: &TransparencyConfig) -> PathBuf {
        let target_dir = output_dir.map(|dir| {
            if self.relative_dir.as_os_str().is_empty() {
                dir.to_path_buf()
            } else {
                dir.join(&self.relative_dir)
            }
        });
        OutputFormatHandler::derive_output_path(
            &self.path,
            target_dir.as_deref(),
            config.output_format,
        )
    }
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose, cli.log_format.into()).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;
    debug!(?config, "Resolved configuration");

    let start_time = Instant::now();
    let processed_count = process_inputs(&cli, &config)?;

    info!(
        "Processed {} image(s) in {:.2}s",
        processed_count,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Process every input, returning the number of images written
fn process_inputs(cli: &Cli, config: &TransparencyConfig) -> Result<usize> {
    let batch_mode = cli.input.len() > 1 || cli.input.iter().any(|i| Path::new(i).is_dir());

    if !batch_mode {
        let input = cli
            .input
            .first()
            .map(PathBuf::from)
            .context("At least one input is required")?;
        let output = match &cli.output {
            Some(output) => PathBuf::from(output),
            None => OutputFormatHandler::derive_output_path(&input, None, config.output_format),
        };
        process_single(&input, &output, config)?;
        return Ok(1);
    }

    let files = expand_inputs(&cli.input, cli.recursive, cli.pattern.as_deref())?;
    if files.is_empty() {
        anyhow::bail!("No image files found in the given inputs");
    }

    let output_dir = cli.output.as_ref().map(PathBuf::from);
    if let Some(dir) = &output_dir {
        if dir.is_file() {
            anyhow::bail!(
                "Output '{}' is a file; batch processing needs a directory",
                dir.display()
            );
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    process_batch(&files, output_dir.as_deref(), config, cli.progress)
}

fn process_single(input: &Path, output: &Path, config: &TransparencyConfig) -> Result<()> {
    let mut processor = BackgroundTransparencyProcessor::with_progress_reporter(
        config.clone(),
        Box::new(ConsoleProgressReporter::new(true)),
    )
    .context("Failed to create processor")?;

    let result = processor
        .process_file(input, output)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    debug!("{}", result.summary());
    Ok(())
}

fn process_batch(
    files: &[BatchInput],
    output_dir: Option<&Path>,
    config: &TransparencyConfig,
    show_progress: bool,
) -> Result<usize> {
    let _span = spans::batch_processing(files.len()).entered();

    let progress_bar = if show_progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut processor = BackgroundTransparencyProcessor::with_progress_reporter(
        config.clone(),
        Box::new(ConsoleProgressReporter::new(false)),
    )
    .context("Failed to create processor")?;

    let mut processed = 0;
    let mut failed = 0;
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    for (index, item) in files.iter().enumerate() {
        let input = item.path.as_path();
        let _item = spans::batch_item(index, input).entered();
        let output = item.output_path(output_dir, config);

        if let Some(bar) = &progress_bar {
            bar.set_message(input.display().to_string());
        }

        match prepare_output(&output, input, output_dir.is_some(), &mut claimed) {
            Ok(()) => match processor.process_file(input, &output) {
                Ok(result) => {
                    processed += 1;
                    debug!("{}", result.summary());
                },
                Err(e) => {
                    failed += 1;
                    events::error_with_context(&e, &format!("{} stage for {}", e.stage(), input.display()));
                },
            },
            Err(e) => {
                failed += 1;
                events::error_with_context(&*e, &format!("output for {}", input.display()));
            },
        }

        if let Some(bar) = &progress_bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress_bar {
        bar.finish_with_message("done");
    }

    if failed > 0 {
        anyhow::bail!("{} of {} image(s) failed", failed, files.len());
    }

    Ok(processed)
}

/// Reserve `output` for `input` and create its directory inside the batch
/// output directory
///
/// Two inputs that map to the same output (`x.png` and `x.jpg`) would
/// overwrite each other; the later one is rejected.
fn prepare_output<'a>(
    output: &Path,
    input: &'a Path,
    create_parent: bool,
    claimed: &mut HashMap<PathBuf, &'a Path>,
) -> Result<()> {
    if let Some(previous) = claimed.get(output) {
        anyhow::bail!(
            "output {} is already taken by {}",
            output.display(),
            previous.display()
        );
    }
    if create_parent {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }
    claimed.insert(output.to_path_buf(), input);
    Ok(())
}

/// Expand file and directory inputs into the list of images to process
///
/// Explicit file paths are kept even if they do not exist so the pipeline
/// reports them. Directory scans skip unsupported extensions, files not
/// matching `pattern`, and previous outputs of this tool.
fn expand_inputs(inputs: &[String], recursive: bool, pattern: Option<&str>) -> Result<Vec<BatchInput>> {
    let pattern = pattern
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid file pattern")?;

    let mut files = Vec::new();
    for input in inputs {
        let path = PathBuf::from(input);
        if !path.is_dir() {
            files.push(BatchInput::explicit(path));
            continue;
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let before = files.len();
        for entry in WalkDir::new(&path)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let file = entry.into_path();
            if !ImageIOService::is_supported_format(&file) {
                continue;
            }
            if is_previous_output(&file) {
                debug!("Skipping previous output {}", file.display());
                continue;
            }
            if let Some(pattern) = &pattern {
                let name = file.file_name().map(|n| n.to_string_lossy().to_string());
                if !name.is_some_and(|n| pattern.matches(&n)) {
                    continue;
                }
            }
            let relative_dir = file
                .parent()
                .and_then(|parent| parent.strip_prefix(&path).ok())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            files.push(BatchInput { path: file, relative_dir });
        }

        if files.len() == before {
            warn!("No matching images in directory {}", path.display());
            events::warning_with_recommendation(
                &format!("directory {} yielded no images", path.display()),
                "check --pattern or pass --recursive",
            );
        }
    }

    Ok(files)
}

fn is_previous_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}
