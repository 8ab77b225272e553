//! Coverage-gated trailing means and gap detection.

use chrono::Duration;

use crate::processing::types::{GapInterval, Observation, RollingPoint};
use crate::processing::utility::mean;

/// Fraction of the window that must be spanned by data before a mean is trusted.
pub const MIN_WINDOW_COVERAGE: f64 = 0.75;

/// Default trailing window.
pub fn default_window() -> Duration {
    Duration::hours(24)
}

/// Computes one trailing-window mean per observation.
///
/// The window for index `i` extends left while the next older point is no
/// more than `window` before `observations[i]`. A channel is `None` when the
/// window spans less than [`MIN_WINDOW_COVERAGE`] of `window` or holds no value
/// for that channel. `observations` must be sorted ascending by date.
pub fn rolling_means(observations: &[Observation], window: Duration) -> Vec<RollingPoint> {
    let window_ms = window.num_milliseconds();

    observations
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let mut start = i;
            while start > 0
                && (current.date - observations[start - 1].date).num_milliseconds() <= window_ms
            {
                start -= 1;
            }

            let span = &observations[start..=i];
            let coverage = if window_ms > 0 {
                (current.date - span[0].date).num_milliseconds() as f64 / window_ms as f64
            } else {
                0.0
            };

            let channel = |pick: fn(&Observation) -> Option<f64>| {
                if coverage < MIN_WINDOW_COVERAGE {
                    return None;
                }
                let values: Vec<f64> = span.iter().filter_map(pick).collect();
                mean(&values)
            };

            RollingPoint {
                date: current.date,
                external: channel(|o| o.external),
                internal: channel(|o| o.internal),
            }
        })
        .collect()
}

/// Finds the runs of points where either channel is null.
///
/// A gap opens at the first null point and closes at the next point where both
/// channels have values; a gap still open at the end closes on the last point.
pub fn find_gaps(points: &[RollingPoint]) -> Vec<GapInterval> {
    let mut gaps = Vec::new();
    let mut open = None;

    for point in points {
        if point.is_gap() {
            if open.is_none() {
                open = Some(point.date);
            }
        } else if let Some(start) = open.take() {
            gaps.push(GapInterval {
                start,
                end: point.date,
            });
        }
    }

    if let (Some(start), Some(last)) = (open, points.last()) {
        gaps.push(GapInterval {
            start,
            end: last.date,
        });
    }

    gaps
}
