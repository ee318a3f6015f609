//! Benchmark trend report generator
//!
//! Turns per-benchmark CSV histories into trend charts and a single HTML
//! report:
//! - benchmark record loading (`record`)
//! - anomaly threshold calculation (`threshold`)
//! - chart rendering (`chart`)
//! - HTML report assembly (`report`)
//! - the end-to-end run (`pipeline`)

pub mod chart;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod threshold;

pub use chart::{ChartRenderer, RenderedChart};
pub use config::{ChartStyle, FailurePolicy, MetricPalette, ReportConfig};
pub use error::{ReportError, Result};
pub use pipeline::{ChartOutcome, FileFailure, ReportSummary, generate_report};
pub use record::{BenchmarkRecord, Metric, RecordSet};
pub use report::ReportBuilder;
pub use threshold::{TrendAssessment, anomaly_threshold};
