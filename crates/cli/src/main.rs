//! CLI entry point for the tick resampler.
//!
//! Reads a tick-level trade log, resamples it onto a fixed window grid and
//! writes the feature table as CSV.

mod argfile;

use anyhow::{Context, Result};
use clap::Parser;
use resampler_core::{Config, TimeFormat};
use resampler_features::ResampleEngine;
use resampler_ingestion::{EventReader, TableWriter};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tick-resampler",
    version,
    about = "Resample a tick-level trade log into a dense fixed-interval feature table",
    after_help = "Arguments of the form @FILE are replaced by the lines of FILE, one argument per line."
)]
struct Cli {
    /// Input CSV with TIME, PRICE and VOLUME columns
    input: PathBuf,

    /// Write the table to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file (missing fields take defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window size in seconds
    #[arg(long, allow_negative_numbers = true)]
    window_secs: Option<i64>,

    /// Number of trailing price columns
    #[arg(long)]
    trailing_count: Option<usize>,

    /// Largest trailing row offset
    #[arg(long)]
    max_offset: Option<usize>,

    /// IANA time zone anchoring day-relative rounding
    #[arg(long)]
    timezone: Option<String>,

    /// TIME column rendering: epoch or datetime
    #[arg(long, value_parser = parse_time_format)]
    time_format: Option<TimeFormat>,

    /// Print the run summary as JSON to stderr
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Load the config file (if any) and apply flag overrides.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("failed to load config {:?}", path))?,
            None => Config::default(),
        };

        if let Some(window_secs) = self.window_secs {
            config.window.window_secs = window_secs;
        }
        if let Some(timezone) = &self.timezone {
            config.window.timezone = timezone.clone();
        }
        if let Some(count) = self.trailing_count {
            config.trailing.count = count;
        }
        if let Some(max_offset) = self.max_offset {
            config.trailing.max_offset = max_offset;
        }
        if let Some(time_format) = self.time_format {
            config.output.time_format = time_format;
        }
        Ok(config)
    }
}

fn parse_time_format(raw: &str) -> Result<TimeFormat, String> {
    raw.parse().map_err(|e: resampler_core::Error| e.to_string())
}

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let engine = ResampleEngine::new(&config).context("invalid configuration")?;
    debug!(?config, offsets = ?engine.trailing_offsets(), "configured");

    let events = EventReader::read_path(&cli.input)
        .with_context(|| format!("failed to read trade log {:?}", cli.input))?;
    let resampled = engine.run(&events)?;

    let writer = TableWriter::new(
        config.output.time_format,
        *engine.normalizer(),
        engine.trailing_count(),
    );
    match &cli.output {
        Some(path) => {
            writer
                .write_path(path, &resampled.rows)
                .with_context(|| format!("failed to write {:?}", path))?;
            info!(rows = resampled.rows.len(), output = %path.display(), "wrote feature table");
        }
        None => writer.write_to(std::io::stdout().lock(), &resampled.rows)?,
    }

    if cli.summary {
        eprintln!("{}", serde_json::to_string_pretty(&resampled.summary)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = argfile::expand_args(std::env::args())?;
    let cli = Cli::parse_from(args);
    init_tracing(cli.log_level());
    run(&cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_over_defaults() {
        let cli = Cli::parse_from([
            "tick-resampler",
            "in.csv",
            "--window-secs",
            "300",
            "--max-offset",
            "60",
            "--time-format",
            "datetime",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.window.window_secs, 300);
        assert_eq!(config.trailing.max_offset, 60);
        assert_eq!(config.trailing.count, 10);
        assert_eq!(config.output.time_format, TimeFormat::Datetime);
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(Cli::parse_from(["t", "in.csv"]).log_level(), "info");
        assert_eq!(Cli::parse_from(["t", "in.csv", "-vv"]).log_level(), "trace");
        assert_eq!(Cli::parse_from(["t", "in.csv", "-q"]).log_level(), "warn");
    }

    #[test]
    fn test_bad_time_format_rejected() {
        assert!(Cli::try_parse_from(["t", "in.csv", "--time-format", "iso"]).is_err());
    }
}
