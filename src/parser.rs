//! Raw dataset rows to typed, date-ordered observations.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::DATE_COLUMN;
use crate::processing::types::{Observation, RawRow, Timestamp};
use crate::processing::utility::{median, parse_number};

/// Minimum number of reporting devices before an indoor value is emitted.
pub const MIN_CONSENSUS_DEVICES: usize = 2;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Minute-precision forms with a zone, which RFC 3339 parsing rejects.
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%#z", "%Y-%m-%d %H:%M%#z"];

/// Parses a date-bin cell into a wall-clock timestamp.
///
/// Offsets in RFC 3339 input are normalised to UTC. Returns `None` for
/// anything that does not describe a valid date.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    let zoned = match raw.strip_suffix(['Z', 'z']) {
        Some(utc) => format!("{utc}+00:00"),
        None => raw.to_string(),
    };
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Some(dt.naive_utc());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Reads the date-bin column of `row`.
pub fn row_timestamp(row: &RawRow) -> Option<Timestamp> {
    row.get(DATE_COLUMN).and_then(|raw| parse_timestamp(raw))
}

/// Reads a numeric cell from `row`; missing, empty or invalid cells are `None`.
pub fn cell_value(row: &RawRow, column: &str) -> Option<f64> {
    parse_number(row.get(column).map(String::as_str))
}

/// Median of the reporting devices, or `None` below [`MIN_CONSENSUS_DEVICES`].
pub fn device_consensus(row: &RawRow, internal_columns: &[String]) -> Option<f64> {
    let values: Vec<f64> = internal_columns
        .iter()
        .filter_map(|col| cell_value(row, col))
        .collect();

    if values.len() < MIN_CONSENSUS_DEVICES {
        return None;
    }
    median(&values)
}

/// Converts raw rows into observations sorted ascending by date.
///
/// Rows without a valid date bin are dropped. Rows sharing a timestamp keep
/// their original relative order.
pub fn parse_observations(
    rows: &[RawRow],
    external_column: Option<&str>,
    internal_columns: &[String],
) -> Vec<Observation> {
    let mut observations: Vec<Observation> = rows
        .iter()
        .filter_map(|row| {
            let date = row_timestamp(row)?;
            Some(Observation {
                date,
                external: external_column.and_then(|col| cell_value(row, col)),
                internal: device_consensus(row, internal_columns),
            })
        })
        .collect();

    let dropped = rows.len() - observations.len();
    if dropped > 0 {
        debug!(dropped, total = rows.len(), "Dropped rows with invalid date bins");
    }

    // stable: ties stay in row order
    observations.sort_by_key(|o| o.date);
    observations
}
