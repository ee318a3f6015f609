//! Report generation configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chart::parse_hex_color;
use crate::error::{ReportError, Result};
use crate::record::Metric;

/// Top-level report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory receiving chart images and the report
    pub output_dir: PathBuf,
    /// File name of the HTML report inside `output_dir`
    pub report_file_name: String,
    /// Document title of the HTML report
    pub report_title: String,
    /// Caption placed under every chart heading
    pub caption: String,
    /// What to do when a single input file fails
    pub failure_policy: FailurePolicy,
    /// Chart appearance
    pub chart: ChartStyle,
}

/// Handling of per-file failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failure aborts the run, no report is written
    #[default]
    Abort,
    /// Failed files are listed in the report and the run continues
    Isolate,
}

/// Chart appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Title font size
    pub title_font_size: u32,
    /// Tick label font size
    pub label_font_size: u32,
    /// Stroke width of the metric series
    pub line_width: u32,
    /// Series colors
    pub palette: MetricPalette,
}

/// Hex colors per metric series, plus the reserved threshold color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricPalette {
    pub min: String,
    pub max: String,
    pub med: String,
    pub avg: String,
    pub threshold: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            report_file_name: "report.html".to_string(),
            report_title: "Performance Metrics".to_string(),
            caption: "Details generated".to_string(),
            failure_policy: FailurePolicy::Abort,
            chart: ChartStyle::default(),
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title_font_size: 28,
            label_font_size: 14,
            line_width: 3,
            palette: MetricPalette::default(),
        }
    }
}

impl Default for MetricPalette {
    fn default() -> Self {
        Self {
            min: "#1f77b4".to_string(),
            max: "#aec7e8".to_string(),
            med: "#ff7f0e".to_string(),
            avg: "#ffbb78".to_string(),
            threshold: "#ff1111".to_string(),
        }
    }
}

impl MetricPalette {
    /// Hex color of a metric series
    pub fn color_of(&self, metric: Metric) -> &str {
        match metric {
            Metric::Min => &self.min,
            Metric::Max => &self.max,
            Metric::Med => &self.med,
            Metric::Avg => &self.avg,
        }
    }

    fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            parse_hex_color(self.color_of(metric))?;
        }
        parse_hex_color(&self.threshold)?;
        Ok(())
    }
}

impl ReportConfig {
    /// Load configuration from a file
    ///
    /// `.toml` files are parsed as TOML, everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|e| {
                ReportError::configuration(format!("invalid TOML in {}: {e}", path.display()))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                ReportError::configuration(format!("invalid JSON in {}: {e}", path.display()))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a report
    pub fn validate(&self) -> Result<()> {
        let name = self.report_file_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ReportError::configuration(format!(
                "report file name '{}' must be a plain file name",
                self.report_file_name
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ReportError::configuration(format!(
                "chart size {}x{} must be non-zero",
                self.chart.width, self.chart.height
            )));
        }
        self.chart.palette.validate()
    }

    /// Full path of the HTML report
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file_name)
    }
}
