//! Export of stored runs for plotting tools.

use std::fmt::Write;

use ps_results::TimeseriesRecord;

pub const CSV_HEADER: &str = "time_s,desired,actual,stabilised,control";

/// The four equal-length sequences a plotting frontend consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesExport {
    pub time: Vec<f64>,
    pub desired: Vec<f64>,
    pub actual: Vec<f64>,
    pub stabilised: Vec<f64>,
}

pub fn to_series_export(records: &[TimeseriesRecord]) -> SeriesExport {
    let mut out = SeriesExport {
        time: Vec::with_capacity(records.len()),
        desired: Vec::with_capacity(records.len()),
        actual: Vec::with_capacity(records.len()),
        stabilised: Vec::with_capacity(records.len()),
    };
    for r in records {
        out.time.push(r.time_s);
        out.desired.push(r.desired);
        out.actual.push(r.actual);
        out.stabilised.push(r.stabilised);
    }
    out
}

/// CSV with a header row and one line per sample.
pub fn to_csv(records: &[TimeseriesRecord]) -> String {
    let mut csv = String::with_capacity(32 * (records.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for r in records {
        // Writing to a String cannot fail.
        let _ = writeln!(
            csv,
            "{},{},{},{},{}",
            r.time_s, r.desired, r.actual, r.stabilised, r.control
        );
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TimeseriesRecord> {
        vec![
            TimeseriesRecord {
                time_s: 0.0,
                desired: 0.0,
                actual: 0.0,
                stabilised: 0.0,
                control: 0.0,
            },
            TimeseriesRecord {
                time_s: 0.5,
                desired: 5.0,
                actual: 0.0,
                stabilised: 1.25,
                control: 8.5,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = to_csv(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[2], "0.5,5,0,1.25,8.5");
    }

    #[test]
    fn series_export_has_equal_lengths() {
        let export = to_series_export(&sample());
        assert_eq!(export.time, vec![0.0, 0.5]);
        assert_eq!(export.desired.len(), 2);
        assert_eq!(export.actual.len(), 2);
        assert_eq!(export.stabilised, vec![0.0, 1.25]);
    }
}
