use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    io::sink::OutputFormat,
    models::request_params::{TrailingPeriod, parse_date},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Flag unusual daily price moves with a rolling z-score")]
pub struct Cli {
    /// Path to an optional TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one ticker and print or save the report
    Detect(DetectArgs),

    /// Read "TICKER [START|PERIOD] [END]" lines from stdin and analyze each
    Interactive(InteractiveArgs),
}

/// Settings that override the config file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct OverrideArgs {
    /// Rolling window length in trading days
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Absolute z-score above which a day is flagged
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Read bars from this JSON file instead of the configured provider
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Cache lifetime in seconds; 0 disables caching
    #[arg(long)]
    pub cache_ttl: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Ticker symbol, e.g. AAPL
    pub ticker: String,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, conflicts_with = "period")]
    pub start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Trailing period: 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, ytd, max [default: 1y]
    #[arg(long)]
    pub period: Option<TrailingPeriod>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Also print every observation with its rolling statistics
    #[arg(long)]
    pub show_series: bool,

    /// Write the report as JSON into this directory instead of printing it
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InteractiveArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Also print every observation with its rolling statistics
    #[arg(long)]
    pub show_series: bool,
}
