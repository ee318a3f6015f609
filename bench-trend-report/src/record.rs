//! Benchmark record loading
//!
//! Each input file is a CSV table with a header row naming at least the
//! columns `tag`, `min`, `max`, `med` and `avg`. Rows are kept in file order,
//! which is chronological by construction.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Columns every input file must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["tag", "min", "max", "med", "avg"];

/// Timing metric plotted as its own series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Min,
    Max,
    Med,
    Avg,
}

impl Metric {
    /// Plot order of the series
    pub const ALL: [Metric; 4] = [Metric::Min, Metric::Max, Metric::Med, Metric::Avg];

    /// CSV column and legend name
    pub fn column(self) -> &'static str {
        match self {
            Metric::Min => "min",
            Metric::Max => "max",
            Metric::Med => "med",
            Metric::Avg => "avg",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Build identifier, kept verbatim
    pub tag: String,
    pub min: f64,
    pub max: f64,
    pub med: f64,
    pub avg: f64,
}

impl BenchmarkRecord {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Min => self.min,
            Metric::Max => self.max,
            Metric::Med => self.med,
            Metric::Avg => self.avg,
        }
    }
}

/// Parsed rows of one input file
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    source: PathBuf,
    records: Vec<BenchmarkRecord>,
}

impl RecordSet {
    /// Build a record set from rows already in memory
    pub fn new(source: impl Into<PathBuf>, records: Vec<BenchmarkRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    /// Read a CSV file
    ///
    /// Header names are matched case-insensitively and extra columns are
    /// ignored. A file without data rows is rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| ReportError::data_format(path, e.to_string()))?;

        let headers: StringRecord = reader
            .headers()
            .map_err(|e| ReportError::data_format(path, e.to_string()))?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::data_format(
                path,
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }
        reader.set_headers(headers);

        let mut records = Vec::new();
        for (row, result) in reader.deserialize::<BenchmarkRecord>().enumerate() {
            // header is line 1
            let record = result.map_err(|e| {
                ReportError::data_format(path, format!("row {}: {e}", row + 2))
            })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(ReportError::data_format(path, "no data rows"));
        }

        log::debug!("Loaded {} rows from {}", records.len(), path.display());
        Ok(Self::new(path, records))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tags in row order
    pub fn tags(&self) -> Vec<String> {
        self.records.iter().map(|r| r.tag.clone()).collect()
    }

    /// One metric column in row order
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    /// Chart title: the source file name without directory and extension
    pub fn title(&self) -> String {
        chart_title(&self.source)
    }
}

/// Base name of `path` with the extension stripped
pub fn chart_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
