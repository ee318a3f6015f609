//! Error types for report generation

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning benchmark files into a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Input file missing, unreadable, malformed or lacking a required column
    #[error("Data format error in {}: {message}", .path.display())]
    DataFormat { path: PathBuf, message: String },

    /// A chart could not be drawn or saved
    #[error("Render error for chart '{chart}': {message}")]
    Render { chart: String, message: String },

    /// The report or the output directory could not be written
    #[error("Write error for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub fn data_format(path: &Path, message: impl Into<String>) -> Self {
        Self::DataFormat {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn render(chart: &str, message: impl Into<String>) -> Self {
        Self::Render {
            chart: chart.to_string(),
            message: message.into(),
        }
    }

    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the failure belongs to a single input file rather than the run
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::DataFormat { .. } | Self::Render { .. })
    }
}
