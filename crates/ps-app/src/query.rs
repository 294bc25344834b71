//! Query helpers for extracting data from loaded runs.

use ps_results::{SERIES_NAMES, TimeseriesRecord};
use ps_sim::{SimRecord, StepMetrics};

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and data.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub final_desired: f64,
    pub final_stabilised: f64,
}

/// Get run summary from timeseries records.
pub fn get_run_summary(records: &[TimeseriesRecord]) -> AppResult<RunSummary> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AppError::InvalidInput("No records in run".to_string())),
    };

    Ok(RunSummary {
        time_range: (first.time_s, last.time_s),
        record_count: records.len(),
        final_desired: last.desired,
        final_stabilised: last.stabilised,
    })
}

/// Extract `(time, value)` pairs for one named series.
pub fn extract_series(records: &[TimeseriesRecord], series: &str) -> AppResult<Vec<(f64, f64)>> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let value = record.value(series).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unknown series: {} (expected one of {})",
                series,
                SERIES_NAMES.join(", ")
            ))
        })?;
        out.push((record.time_s, value));
    }
    Ok(out)
}

/// Step-response metrics recomputed from stored samples.
pub fn step_metrics(records: &[TimeseriesRecord]) -> Option<StepMetrics> {
    let record = SimRecord {
        t: records.iter().map(|r| r.time_s).collect(),
        desired: records.iter().map(|r| r.desired).collect(),
        actual: records.iter().map(|r| r.actual).collect(),
        stabilised: records.iter().map(|r| r.stabilised).collect(),
        control: records.iter().map(|r| r.control).collect(),
    };
    ps_sim::analyze_step(&record, ps_sim::response::DEFAULT_SETTLING_BAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<TimeseriesRecord> {
        (0..5)
            .map(|i| TimeseriesRecord {
                time_s: i as f64 * 0.5,
                desired: 1.0,
                actual: 0.0,
                stabilised: i as f64 * 0.25,
                control: 1.0 - i as f64 * 0.25,
            })
            .collect()
    }

    #[test]
    fn summary_covers_range() {
        let summary = get_run_summary(&records()).unwrap();
        assert_eq!(summary.time_range, (0.0, 2.0));
        assert_eq!(summary.record_count, 5);
        assert_eq!(summary.final_stabilised, 1.0);
    }

    #[test]
    fn summary_of_empty_run_fails() {
        assert!(matches!(
            get_run_summary(&[]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn extract_known_and_unknown_series() {
        let series = extract_series(&records(), "stabilised").unwrap();
        assert_eq!(series[2], (1.0, 0.5));
        assert!(extract_series(&records(), "pressure").is_err());
    }

    #[test]
    fn metrics_from_records() {
        let metrics = step_metrics(&records()).unwrap();
        assert_eq!(metrics.final_value, 1.0);
        assert!(!metrics.diverged);
        assert!(step_metrics(&[]).is_none());
    }
}
