//! Destinations for finished detection reports.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::info;
use uuid::Uuid;

use crate::{
    io::table::{render_anomaly_table, render_series, render_summary},
    models::report::DetectionReport,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The report could not be serialized.
    #[snafu(display("Failed to encode report: {source}"))]
    Encode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The output directory could not be created.
    #[snafu(display("Failed to create output directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Writing to a file or stream failed.
    #[snafu(display("Failed to write {target}: {source}"))]
    Write {
        target: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait ReportSink {
    /// What a successful write hands back, e.g. the path of a created file.
    type Output;

    async fn write(&self, report: &DetectionReport) -> Result<Self::Output, SinkError>;
}

/// How reports are printed to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Prints reports to stdout as text tables or pretty JSON.
#[derive(Clone, Debug, Default)]
pub struct StdoutSink {
    pub format: OutputFormat,
    /// Include the full annotated series, not only the anomaly table.
    pub show_series: bool,
}

impl StdoutSink {
    pub fn new(format: OutputFormat, show_series: bool) -> Self {
        Self { format, show_series }
    }

    /// The exact text [`ReportSink::write`] prints.
    pub fn render(&self, report: &DetectionReport) -> Result<String, SinkError> {
        match self.format {
            OutputFormat::Json => {
                let mut text = serde_json::to_string_pretty(report).context(EncodeSnafu)?;
                text.push('\n');
                Ok(text)
            }
            OutputFormat::Table => {
                let mut text = render_summary(report);
                if self.show_series {
                    text.push('\n');
                    text.push_str(&render_series(report));
                }
                text.push('\n');
                text.push_str(&render_anomaly_table(report));
                Ok(text)
            }
        }
    }
}

#[async_trait]
impl ReportSink for StdoutSink {
    type Output = ();

    async fn write(&self, report: &DetectionReport) -> Result<(), SinkError> {
        let text = self.render(report)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .context(WriteSnafu { target: "stdout" })
    }
}

/// Writes each report as a JSON file named `{TICKER}_{timestamp}_{uuid}.json`.
#[derive(Clone, Debug)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(ticker: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        format!("{}_{}_{}.json", ticker, timestamp, Uuid::new_v4())
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    type Output = PathBuf;

    async fn write(&self, report: &DetectionReport) -> Result<PathBuf, SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context(CreateDirSnafu { path: self.dir.clone() })?;

        let bytes = serde_json::to_vec_pretty(report).context(EncodeSnafu)?;
        let path = self.dir.join(Self::file_name(&report.ticker));
        tokio::fs::write(&path, bytes).await.context(WriteSnafu {
            target: path.display().to_string(),
        })?;

        info!(path = %path.display(), anomalies = report.anomalies().len(), "report written");
        Ok(path)
    }
}
