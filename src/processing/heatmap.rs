//! Day-of-week by hour-of-day heatmap with two-level device medians.

use chrono::{Datelike, Timelike};
use tracing::debug;

use crate::parser::{cell_value, row_timestamp};
use crate::processing::types::{HeatmapCell, RawRow, Timestamp};
use crate::processing::utility::median;

/// Weekday names, Monday first.
pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const HOURS: u32 = 24;

/// Monday-first weekday index (Monday = 0, Sunday = 6).
pub fn weekday_index(date: &Timestamp) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Per-cell, per-device sample buckets for the full 7×24 grid.
struct Buckets {
    devices: usize,
    cells: Vec<Vec<Vec<f64>>>,
}

impl Buckets {
    fn new(devices: usize) -> Self {
        Self {
            devices,
            cells: vec![vec![Vec::new(); devices]; DAYS.len() * HOURS as usize],
        }
    }

    fn slot(day: usize, hour: u32) -> usize {
        day * HOURS as usize + hour as usize
    }

    fn push(&mut self, day: usize, hour: u32, device: usize, value: f64) {
        self.cells[Self::slot(day, hour)][device].push(value);
    }

    fn get(&self, day: usize, hour: u32) -> &[Vec<f64>] {
        &self.cells[Self::slot(day, hour)]
    }
}

/// Buckets positive device readings by weekday and hour and consolidates each cell.
///
/// A cell is emitted only when every device has at least one reading in it;
/// its value is the median of the per-device medians. Cells are ordered
/// Monday to Sunday, then by hour.
pub fn heatmap_cells(rows: &[RawRow], internal_columns: &[String]) -> Vec<HeatmapCell> {
    let mut buckets = Buckets::new(internal_columns.len());

    for row in rows {
        let Some(date) = row_timestamp(row) else {
            continue;
        };
        let day = weekday_index(&date);
        let hour = date.hour();

        for (device, column) in internal_columns.iter().enumerate() {
            if let Some(value) = cell_value(row, column).filter(|v| *v > 0.0) {
                buckets.push(day, hour, device, value);
            }
        }
    }

    let mut cells = Vec::new();
    let mut incomplete = 0usize;

    for (day, name) in DAYS.iter().enumerate() {
        for hour in 0..HOURS {
            let devices = buckets.get(day, hour);
            if devices.is_empty() || devices.iter().any(Vec::is_empty) {
                incomplete += 1;
                continue;
            }

            let device_medians: Vec<f64> = devices.iter().filter_map(|d| median(d)).collect();
            let Some(value) = median(&device_medians) else {
                continue;
            };

            cells.push(HeatmapCell {
                day: name.to_string(),
                hour,
                value,
                count: buckets.devices,
            });
        }
    }

    debug!(cells = cells.len(), incomplete, "Heatmap cells consolidated");
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn devices(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("NO2_DEVICE_{i}")).collect()
    }

    #[test]
    fn test_weekday_index_is_monday_first() {
        // 2024-01-01 was a Monday
        let at = |day: u32, hour: u32| {
            NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap()
        };
        let monday = at(1, 0);
        let saturday = at(6, 0);
        let sunday = at(7, 23);
        assert_eq!(weekday_index(&monday), 0);
        assert_eq!(weekday_index(&saturday), 5);
        assert_eq!(weekday_index(&sunday), 6);
        assert_eq!(DAYS[weekday_index(&sunday)], "Sunday");
    }

    #[test]
    fn test_cell_with_empty_device_is_omitted() {
        let rows = vec![
            row(&[("date_bin", "2024-01-01T10:00"), ("NO2_DEVICE_1", "10")]),
            row(&[("date_bin", "2024-01-08T10:00"), ("NO2_DEVICE_1", "20"), ("NO2_DEVICE_2", "")]),
        ];
        assert!(heatmap_cells(&rows, &devices(2)).is_empty());
    }

    #[test]
    fn test_two_level_median() {
        let rows = vec![
            row(&[
                ("date_bin", "2024-01-02T08:00"),
                ("NO2_DEVICE_1", "10"),
                ("NO2_DEVICE_2", "1"),
                ("NO2_DEVICE_3", "30"),
            ]),
            row(&[
                ("date_bin", "2024-01-09T08:30"),
                ("NO2_DEVICE_1", "20"),
                ("NO2_DEVICE_2", "3"),
                ("NO2_DEVICE_3", "-5"),
            ]),
        ];
        let cells = heatmap_cells(&rows, &devices(3));

        // device medians 15, 2, 30
        assert_eq!(
            cells,
            vec![HeatmapCell {
                day: "Tuesday".to_string(),
                hour: 8,
                value: 15.0,
                count: 3,
            }]
        );
    }

    #[test]
    fn test_cells_are_ordered_day_then_hour() {
        let rows = vec![
            row(&[("date_bin", "2024-01-07T01:00"), ("NO2_DEVICE_1", "1")]),
            row(&[("date_bin", "2024-01-01T05:00"), ("NO2_DEVICE_1", "2")]),
            row(&[("date_bin", "2024-01-01T02:00"), ("NO2_DEVICE_1", "3")]),
            row(&[("date_bin", "bad"), ("NO2_DEVICE_1", "4")]),
        ];
        let cells = heatmap_cells(&rows, &devices(1));
        let keys: Vec<_> = cells.iter().map(|c| (c.day.as_str(), c.hour)).collect();
        assert_eq!(keys, vec![("Monday", 2), ("Monday", 5), ("Sunday", 1)]);
    }
}
