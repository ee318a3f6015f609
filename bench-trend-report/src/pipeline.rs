//! End-to-end report run: load, assess, render, assemble, write

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::chart::ChartRenderer;
use crate::config::{FailurePolicy, ReportConfig};
use crate::error::{ReportError, Result};
use crate::record::{RecordSet, chart_title};
use crate::report::{ReportBuilder, write_file_atomic, write_report};
use crate::threshold::TrendAssessment;

/// One chart that made it into the report
#[derive(Debug, Clone, Serialize)]
pub struct ChartOutcome {
    pub source: PathBuf,
    pub title: String,
    pub image_name: String,
    pub assessment: TrendAssessment,
}

/// One input left out of the report
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: String,
}

/// Result of a report run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub report_path: PathBuf,
    pub charts: Vec<ChartOutcome>,
    pub failures: Vec<FileFailure>,
}

impl ReportSummary {
    /// Charts whose newest `avg` lies above the threshold
    pub fn regressions(&self) -> impl Iterator<Item = &ChartOutcome> {
        self.charts.iter().filter(|c| c.assessment.exceeds)
    }

    /// Write the summary as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ReportError::write(path, e.into()))?;
        write_file_atomic(path, &json)?;
        log::info!("Summary written to {}", path.display());
        Ok(())
    }
}

/// Chart every input and write the HTML report
///
/// With [`FailurePolicy::Abort`] the first failing input stops the run before
/// the report is written. With [`FailurePolicy::Isolate`] failing inputs are
/// listed in the report instead.
pub fn generate_report<P: AsRef<Path>>(config: &ReportConfig, inputs: &[P]) -> Result<ReportSummary> {
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| ReportError::write(&config.output_dir, e))?;

    let renderer = ChartRenderer::new(config.chart.clone(), &config.output_dir);
    let mut builder = ReportBuilder::new(&config.report_title);
    let mut charts = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();
    // image name -> input that produced it
    let mut image_sources: HashMap<String, PathBuf> = HashMap::new();

    for (index, input) in inputs.iter().enumerate() {
        let input = input.as_ref();
        println!(
            "generating graph: {}/{} ({})",
            index,
            inputs.len(),
            input.display()
        );

        let title = chart_title(input);
        let result = match image_sources.get(&format!("{title}.png")) {
            Some(previous) => Err(ReportError::render(
                &title,
                format!(
                    "image {title}.png was already written for {}",
                    previous.display()
                ),
            )),
            None => chart_file(&renderer, input),
        };

        match result {
            Ok(outcome) => {
                image_sources.insert(outcome.image_name.clone(), input.to_path_buf());
                builder.append_chart(&outcome.image_name, &config.caption);
                charts.push(outcome);
            }
            Err(e) if e.is_per_file() && config.failure_policy == FailurePolicy::Isolate => {
                log::error!("Skipping {}: {}", input.display(), e);
                failures.push(FileFailure {
                    source: input.to_path_buf(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    builder.append_failures(
        failures
            .iter()
            .map(|f| (f.source.as_path(), f.error.as_str())),
    );
    let report_path = write_report(&config.report_path(), &builder.finalize())?;

    Ok(ReportSummary {
        report_path,
        charts,
        failures,
    })
}

fn chart_file(renderer: &ChartRenderer, input: &Path) -> Result<ChartOutcome> {
    let records = RecordSet::from_path(input)?;
    let assessment = TrendAssessment::of(&records);
    let chart = renderer.render(&records, assessment.threshold)?;

    if assessment.exceeds {
        log::warn!(
            "{}: latest avg {:.4} exceeds threshold {:.4} (history mean {:.4}, std dev {:.4})",
            chart.title,
            assessment.latest,
            assessment.threshold,
            assessment.history_mean,
            assessment.history_std_dev
        );
    } else {
        log::info!(
            "{}: {} rows, threshold {:.4}",
            chart.title,
            records.len(),
            assessment.threshold
        );
    }

    Ok(ChartOutcome {
        source: input.to_path_buf(),
        title: chart.title,
        image_name: chart.image_name,
        assessment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ReportConfig {
            output_dir: dir.path().join("out"),
            ..ReportConfig::default()
        };
        config.chart.palette.avg = "not-a-color".to_string();

        let err = generate_report(&config, &["a.csv"]).unwrap_err();
        assert!(matches!(err, ReportError::Configuration { .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_no_inputs_writes_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            output_dir: dir.path().to_path_buf(),
            ..ReportConfig::default()
        };

        let summary = generate_report::<&str>(&config, &[]).unwrap();
        assert!(summary.charts.is_empty());
        let html = std::fs::read_to_string(&summary.report_path).unwrap();
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_missing_input_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            output_dir: dir.path().to_path_buf(),
            ..ReportConfig::default()
        };

        let err = generate_report(&config, &[dir.path().join("absent.csv")]).unwrap_err();
        assert!(matches!(err, ReportError::DataFormat { .. }));
        assert!(!dir.path().join("report.html").exists());
    }

    #[test]
    fn test_regressions_filter() {
        let outcome = |title: &str, values: &[f64]| ChartOutcome {
            source: PathBuf::from(format!("{title}.csv")),
            title: title.to_string(),
            image_name: format!("{title}.png"),
            assessment: TrendAssessment::from_values(values),
        };
        let summary = ReportSummary {
            report_path: PathBuf::from("report.html"),
            charts: vec![
                outcome("steady", &[1.0, 1.0, 1.0]),
                outcome("slower", &[1.0, 1.0, 9.0]),
            ],
            failures: Vec::new(),
        };

        let titles: Vec<&str> = summary.regressions().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["slower"]);
    }
}
