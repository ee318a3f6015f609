//! Trend chart rendering
//!
//! One PNG per record set: a line per metric, the anomaly threshold as a
//! horizontal line, and build tags as x tick labels.

use plotters::prelude::*;
use plotters::style::FontTransform;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::config::ChartStyle;
use crate::error::{ReportError, Result};
use crate::record::{Metric, RecordSet};

const FONT_FAMILY: &str = "sans-serif";
const X_AXIS_DESC: &str = "Build";
const Y_AXIS_DESC: &str = "Seconds";

/// Image written for one record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    /// Chart title, the input base name
    pub title: String,
    /// Image file name relative to the output directory
    pub image_name: String,
    pub image_path: PathBuf,
}

/// Draws trend charts into an output directory
pub struct ChartRenderer {
    style: ChartStyle,
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            style,
            output_dir: output_dir.into(),
        }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Render `records` with the given threshold to `<title>.png`
    pub fn render(&self, records: &RecordSet, threshold: f64) -> Result<RenderedChart> {
        let title = records.title();
        let image_name = format!("{title}.png");
        let image_path = self.output_dir.join(&image_name);

        let y_range = value_range(records, threshold).ok_or_else(|| {
            ReportError::render(&title, "invalid numeric data: non-finite metric value")
        })?;

        self.draw(records, threshold, &title, &image_path, y_range)
            .map_err(|e| ReportError::render(&title, e.to_string()))?;

        log::debug!("Saved chart {}", image_path.display());
        Ok(RenderedChart {
            title,
            image_name,
            image_path,
        })
    }

    // The backend and its pixel buffer are owned by this call and dropped on return.
    fn draw(
        &self,
        records: &RecordSet,
        threshold: f64,
        title: &str,
        path: &Path,
        y_range: Range<f64>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let palette = &self.style.palette;
        let line_width = self.style.line_width;
        let threshold_color = parse_hex_color(&palette.threshold)?;

        let tags = records.tags();
        let last_index = i32::try_from(records.len().saturating_sub(1).max(1))?;

        let root = BitMapBackend::new(path, (self.style.width, self.style.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT_FAMILY, f64::from(self.style.title_font_size)))
            .margin(15)
            .x_label_area_size(self.x_label_area_size(&tags))
            .y_label_area_size(70)
            .build_cartesian_2d(0i32..last_index, y_range)?;

        let tag_formatter = |x: &i32| tag_label(&tags, *x);
        chart
            .configure_mesh()
            .x_labels(tags.len().max(2))
            .y_labels(10)
            .x_label_formatter(&tag_formatter)
            .x_label_style(
                (FONT_FAMILY, f64::from(self.style.label_font_size))
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_desc(X_AXIS_DESC)
            .y_desc(Y_AXIS_DESC)
            .draw()?;

        for metric in Metric::ALL {
            let color = parse_hex_color(palette.color_of(metric))?;
            let points = records
                .records()
                .iter()
                .enumerate()
                .map(|(i, r)| (i as i32, r.value(metric)));

            chart
                .draw_series(LineSeries::new(points, color.stroke_width(line_width)))?
                .label(metric.column())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(line_width))
                });
        }

        chart.draw_series(LineSeries::new(
            vec![(0, threshold), (last_index, threshold)],
            threshold_color.stroke_width(2),
        ))?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// Room below the plot for tick labels drawn vertically
    fn x_label_area_size(&self, tags: &[String]) -> u32 {
        let longest = tags.iter().map(|t| t.chars().count()).max().unwrap_or(0) as u32;
        let needed = longest * self.style.label_font_size * 6 / 10 + 40;
        needed.clamp(40, (self.style.height / 3).max(40))
    }
}

/// Tick label for integer position `index`, empty when out of range
pub fn tag_label(tags: &[String], index: i32) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| tags.get(i))
        .cloned()
        .unwrap_or_default()
}

/// Y range covering every metric value and the threshold, padded by 5%
///
/// `None` when any value is not finite.
pub fn value_range(records: &RecordSet, threshold: f64) -> Option<Range<f64>> {
    let values = records
        .records()
        .iter()
        .flat_map(|r| Metric::ALL.map(|m| r.value(m)))
        .chain(std::iter::once(threshold));

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for value in values {
        if !value.is_finite() {
            return None;
        }
        lo = lo.min(value);
        hi = hi.max(value);
    }

    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (hi.abs() * 0.05).max(1.0)
    };
    Some((lo - pad)..(hi + pad))
}

/// Parse `#rrggbb`
pub fn parse_hex_color(hex: &str) -> Result<RGBColor> {
    let invalid = || ReportError::configuration(format!("invalid color '{hex}', expected #rrggbb"));

    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Whether the system can resolve a font for chart text
pub fn text_rendering_available() -> bool {
    (FONT_FAMILY, 12.0).into_font().box_size("0").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BenchmarkRecord;
    use crate::threshold::anomaly_threshold;

    fn record_set(name: &str, avgs: &[f64]) -> RecordSet {
        let rows = avgs
            .iter()
            .enumerate()
            .map(|(i, avg)| BenchmarkRecord {
                tag: format!("build-{i}"),
                min: avg * 0.5,
                max: avg * 1.5,
                med: *avg,
                avg: *avg,
            })
            .collect();
        RecordSet::new(name, rows)
    }

    #[test]
    fn test_tag_label_lookup() {
        let tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(tag_label(&tags, 0), "a");
        assert_eq!(tag_label(&tags, 1), "b");
        assert_eq!(tag_label(&tags, 2), "");
        assert_eq!(tag_label(&tags, -1), "");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1f77b4").unwrap(), RGBColor(0x1f, 0x77, 0xb4));
        assert_eq!(parse_hex_color("#FF1111").unwrap(), RGBColor(255, 17, 17));
        assert!(parse_hex_color("1f77b4").is_err());
        assert!(parse_hex_color("#1f77b").is_err());
        assert!(parse_hex_color("#gg77b4").is_err());
    }

    #[test]
    fn test_value_range_covers_threshold() {
        let set = record_set("bench.csv", &[2.0, 4.0]);
        let range = value_range(&set, 10.0).unwrap();
        assert!(range.start < 1.0);
        assert!(range.end > 10.0);
    }

    #[test]
    fn test_value_range_flat_series_is_widened() {
        let set = RecordSet::new(
            "flat.csv",
            vec![BenchmarkRecord {
                tag: "x".to_string(),
                min: 0.0,
                max: 0.0,
                med: 0.0,
                avg: 0.0,
            }],
        );
        let range = value_range(&set, 0.0).unwrap();
        assert!(range.start < range.end);
    }

    #[test]
    fn test_value_range_rejects_nan() {
        let set = record_set("bench.csv", &[1.0, f64::NAN]);
        assert!(value_range(&set, 1.0).is_none());
    }

    #[test]
    fn test_non_finite_data_is_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(ChartStyle::default(), dir.path());
        let set = record_set("broken.csv", &[1.0, f64::INFINITY]);

        let err = renderer.render(&set, 1.0).unwrap_err();
        assert!(matches!(err, ReportError::Render { .. }));
        assert!(!dir.path().join("broken.png").exists());
    }

    #[test]
    fn test_render_writes_png_named_after_input() {
        if !text_rendering_available() {
            eprintln!("skipping: no system font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(ChartStyle::default(), dir.path());
        let avgs = [1.0, 1.2, 0.9, 3.0];
        let set = record_set("results/query_latency.csv", &avgs);

        let chart = renderer.render(&set, anomaly_threshold(&avgs)).unwrap();
        assert_eq!(chart.title, "query_latency");
        assert_eq!(chart.image_name, "query_latency.png");
        assert_eq!(chart.image_path, dir.path().join("query_latency.png"));

        let bytes = std::fs::read(&chart.image_path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_render_single_row() {
        if !text_rendering_available() {
            eprintln!("skipping: no system font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(ChartStyle::default(), dir.path());
        let set = record_set("single.csv", &[5.0]);

        let chart = renderer.render(&set, anomaly_threshold(&[5.0])).unwrap();
        assert!(chart.image_path.exists());
    }

    #[test]
    fn test_render_into_missing_directory_fails() {
        if !text_rendering_available() {
            eprintln!("skipping: no system font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(ChartStyle::default(), dir.path().join("absent"));
        let set = record_set("bench.csv", &[1.0, 2.0]);

        let err = renderer.render(&set, 1.0).unwrap_err();
        assert!(matches!(err, ReportError::Render { .. }));
    }
}
