//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliBackgroundMode, CliLogFormat, CliOutputFormat};
use crate::{
    config::{BackgroundMode, OutputFormat, TransparencyConfig},
    services::OutputFormatHandler,
    tracing_config::TracingFormat,
};
use anyhow::{Context, Result};
use std::path::Path;

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
        }
    }
}

impl From<CliBackgroundMode> for BackgroundMode {
    fn from(mode: CliBackgroundMode) -> Self {
        match mode {
            CliBackgroundMode::Auto => BackgroundMode::Auto,
            CliBackgroundMode::Light => BackgroundMode::Light,
            CliBackgroundMode::Dark => BackgroundMode::Dark,
        }
    }
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

/// Convert CLI arguments to a `TransparencyConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration: config file (or defaults), then CLI flags
    ///
    /// A `.png`/`.tif`/`.tiff` output path decides the output format over
    /// the config file; an explicit `--format` that contradicts it is
    /// rejected.
    pub(crate) fn from_cli(cli: &Cli) -> Result<TransparencyConfig> {
        let mut config = match &cli.config {
            Some(path) => TransparencyConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => TransparencyConfig::default(),
        };

        if let Some(threshold) = cli.threshold {
            config.threshold = threshold;
        }
        if let Some(tolerance) = cli.light_tolerance {
            config.light_tolerance = tolerance;
        }
        if let Some(tolerance) = cli.dark_tolerance {
            config.dark_tolerance = tolerance;
        }
        if let Some(mode) = cli.background {
            config.background = mode.into();
        }

        let implied = cli
            .output
            .as_deref()
            .and_then(|out| OutputFormatHandler::from_path(Path::new(out)));
        match (cli.format.map(OutputFormat::from), implied) {
            (Some(explicit), Some(implied)) if explicit != implied => {
                anyhow::bail!(
                    "--format {} conflicts with output extension of {}",
                    OutputFormatHandler::get_extension(explicit),
                    cli.output.as_deref().unwrap_or_default()
                );
            },
            (Some(format), _) | (None, Some(format)) => config.output_format = format,
            (None, None) => {},
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, CliBackgroundMode, CliLogFormat, CliOutputFormat};
    use std::io::Write;

    fn create_test_cli() -> Cli {
        Cli {
            input: vec!["test.jpg".to_string()],
            output: None,
            format: None,
            threshold: None,
            light_tolerance: None,
            dark_tolerance: None,
            background: None,
            config: None,
            verbose: 0,
            recursive: false,
            pattern: None,
            progress: false,
            log_format: CliLogFormat::Console,
        }
    }

    #[test]
    fn test_cli_defaults() {
        let config = CliConfigBuilder::from_cli(&create_test_cli()).unwrap();
        assert_eq!(config, TransparencyConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let mut cli = create_test_cli();
        cli.threshold = Some(90);
        cli.light_tolerance = Some(0);
        cli.dark_tolerance = Some(10);
        cli.background = Some(CliBackgroundMode::Light);
        cli.format = Some(CliOutputFormat::Tiff);

        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.threshold, 90);
        assert_eq!(config.light_tolerance, 0);
        assert_eq!(config.dark_tolerance, 10);
        assert_eq!(config.background, BackgroundMode::Light);
        assert_eq!(config.output_format, OutputFormat::Tiff);
    }

    #[test]
    fn test_format_inferred_from_output_extension() {
        let mut cli = create_test_cli();
        cli.output = Some("out/result.tif".to_string());
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.output_format, OutputFormat::Tiff);

        cli.format = Some(CliOutputFormat::Tiff);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.output_format, OutputFormat::Tiff);

        cli.format = Some(CliOutputFormat::Png);
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }

    #[test]
    fn test_output_extension_overrides_config_file_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "output_format": "tiff" }}"#).unwrap();

        let mut cli = create_test_cli();
        cli.config = Some(file.path().to_path_buf());
        cli.output = Some("out.png".to_string());
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.output_format, OutputFormat::Png);

        // Without a recognizable extension the config file still decides
        cli.output = Some("out_dir".to_string());
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.output_format, OutputFormat::Tiff);
    }

    #[test]
    fn test_log_format_conversion() {
        assert_eq!(TracingFormat::from(CliLogFormat::Json), TracingFormat::Json);
        assert_eq!(TracingFormat::from(CliLogFormat::Compact), TracingFormat::Compact);
        assert_eq!(TracingFormat::from(CliLogFormat::Console), TracingFormat::Console);
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "threshold": 10, "dark_tolerance": 99 }}"#).unwrap();

        let mut cli = create_test_cli();
        cli.config = Some(file.path().to_path_buf());
        cli.threshold = Some(200);

        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.threshold, 200);
        assert_eq!(config.dark_tolerance, 99);
    }

    #[test]
    fn test_cli_validation() {
        let mut cli = create_test_cli();
        cli.light_tolerance = Some(800);
        assert!(CliConfigBuilder::from_cli(&cli).is_err());

        let mut cli = create_test_cli();
        cli.config = Some("/no/such/config.json".into());
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }
}
