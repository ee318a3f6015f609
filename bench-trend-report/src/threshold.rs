//! Anomaly threshold calculation
//!
//! The newest value of a series is judged against the rows before it: the
//! threshold is the mean of the history plus two population standard
//! deviations.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::record::{Metric, RecordSet};

/// Number of standard deviations above the mean
const DEVIATION_FACTOR: f64 = 2.0;

/// Mean and population standard deviation of the history
///
/// An empty history yields `(0.0, 0.0)`: both quantities are computed with a
/// denominator of at least one.
fn history_stats(history: &[f64]) -> (f64, f64) {
    if history.is_empty() {
        return (0.0, 0.0);
    }
    (history.iter().mean(), history.iter().population_std_dev())
}

/// Threshold for the last element of `values`, judged against the others
pub fn anomaly_threshold(values: &[f64]) -> f64 {
    let history = values.split_last().map_or(&[][..], |(_, rest)| rest);
    let (mean, std_dev) = history_stats(history);
    mean + DEVIATION_FACTOR * std_dev
}

/// How the newest `avg` value compares to its history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAssessment {
    pub history_mean: f64,
    pub history_std_dev: f64,
    pub threshold: f64,
    pub latest: f64,
    /// Latest value lies strictly above the threshold
    pub exceeds: bool,
}

impl TrendAssessment {
    /// Assess the `avg` column of a record set
    pub fn of(records: &RecordSet) -> Self {
        Self::from_values(&records.column(Metric::Avg))
    }

    pub fn from_values(values: &[f64]) -> Self {
        let (latest, history) = match values.split_last() {
            Some((latest, history)) => (*latest, history),
            None => (0.0, &[][..]),
        };
        let (history_mean, history_std_dev) = history_stats(history);
        let threshold = history_mean + DEVIATION_FACTOR * history_std_dev;

        Self {
            history_mean,
            history_std_dev,
            threshold,
            latest,
            // without history there is nothing to regress against
            exceeds: !history.is_empty() && latest > threshold,
        }
    }
}
