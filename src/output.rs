//! Output of chart record sets.
//!
//! Supports log output, JSON files, and flat CSV record files.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ensure_parent(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes `value` as pretty JSON to `path`, replacing any existing file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path, "Wrote JSON output");
    Ok(())
}

/// Writes flat records to a CSV file at `path` with a header row.
pub fn write_csv<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    debug!(path, records = records.len(), "Writing CSV records");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path, records = records.len(), "Wrote CSV output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::types::{HeatmapCell, RollingPoint};
    use chrono::NaiveDate;
    use std::env;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_points() -> Vec<RollingPoint> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        vec![
            RollingPoint {
                date,
                external: Some(1.5),
                internal: None,
            },
            RollingPoint {
                date,
                external: None,
                internal: Some(2.5),
            },
        ]
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_pretty(&sample_points());
        print_json(&sample_points()).unwrap();
    }

    #[test]
    fn test_write_csv_nulls_are_empty_cells() {
        let path = temp_path("airq_charts_test_points.csv");
        let _ = fs::remove_file(&path);

        write_csv(&path, &sample_points()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,external,internal");
        assert_eq!(lines[1], "2024-01-01T06:00:00,1.5,");
        assert_eq!(lines[2], "2024-01-01T06:00:00,,2.5");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_overwrites() {
        let path = temp_path("airq_charts_test_cells.csv");
        let cells = vec![HeatmapCell {
            day: "Monday".to_string(),
            hour: 3,
            value: 4.0,
            count: 2,
        }];
        write_csv(&path, &cells).unwrap();
        write_csv(&path, &cells).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("day,hour,value,count"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_round_trips_through_serde_json() {
        let path = temp_path("airq_charts_test_out/points.json");
        write_json(&path, &sample_points()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["external"], 1.5);
        assert!(value[0]["internal"].is_null());

        fs::remove_file(&path).unwrap();
    }
}
