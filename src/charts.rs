//! Chart-ready record sets computed from a dataset and a pollutant config.

use rand::Rng;
use tracing::{debug, info};

use crate::config::PollutantConfig;
use crate::parser::parse_observations;
use crate::processing::density::density_summary;
use crate::processing::heatmap::heatmap_cells;
use crate::processing::rolling::{default_window, find_gaps, rolling_means};
use crate::processing::types::{
    BarCategory, BarValue, HeatmapChart, RawRow, RollingPoint, TrendChart, VentilationChart,
    ViolinSeries,
};
use crate::processing::utility::mean;
use crate::processing::ventilation::{balance_devices, collect_samples, usable_categories};

/// Headroom applied above the largest plotted value.
const Y_AXIS_HEADROOM: f64 = 1.1;

/// Mean of the non-null rolling values per channel, as `[Outdoor, Indoor]`.
pub fn overall_means(points: &[RollingPoint]) -> Vec<BarValue> {
    let external: Vec<f64> = points.iter().filter_map(|p| p.external).collect();
    let internal: Vec<f64> = points.iter().filter_map(|p| p.internal).collect();
    vec![
        BarValue {
            category: BarCategory::Outdoor,
            value: mean(&external),
        },
        BarValue {
            category: BarCategory::Indoor,
            value: mean(&internal),
        },
    ]
}

/// Shared y-axis top for the line and bar charts; nulls count as zero.
pub fn y_axis_max(points: &[RollingPoint], daily_limit: Option<f64>) -> f64 {
    let max = points
        .iter()
        .flat_map(|p| [p.external, p.internal])
        .map(|v| v.unwrap_or(0.0))
        .fold(daily_limit.unwrap_or(0.0).max(0.0), f64::max);
    max * Y_AXIS_HEADROOM
}

/// Rolling-mean trend chart with gaps and overall means.
#[tracing::instrument(skip(rows, config), fields(pollutant = %config.key, rows = rows.len()))]
pub fn compute_trends(rows: &[RawRow], config: &PollutantConfig) -> TrendChart {
    let observations = parse_observations(
        rows,
        config.external_column.as_deref(),
        &config.internal_columns,
    );
    let points = rolling_means(&observations, default_window());
    let gaps = find_gaps(&points);
    let averages = overall_means(&points);
    let y_max = y_axis_max(&points, config.limits.daily_limit);

    info!(
        observations = observations.len(),
        gaps = gaps.len(),
        "Trend series computed"
    );

    TrendChart {
        pollutant: config.key.clone(),
        title: format!("{} Concentration ({} Rolling Mean)", config.title, config.period),
        label: config.label.clone(),
        limits: config.limits.clone(),
        points,
        gaps,
        averages,
        y_max,
    }
}

/// Ventilation violins: one density summary per category with readings from every device.
#[tracing::instrument(skip(rows, config, rng), fields(pollutant = %config.key, rows = rows.len()))]
pub fn compute_ventilation<R: Rng + ?Sized>(
    rows: &[RawRow],
    config: &PollutantConfig,
    rng: &mut R,
) -> VentilationChart {
    let samples = collect_samples(rows, &config.internal_columns);
    let cleaned = usable_categories(&samples);

    let domain_max = cleaned
        .iter()
        .flat_map(|(_, arrays)| arrays.iter().flatten().copied())
        .reduce(f64::max);

    let series: Vec<ViolinSeries> = cleaned
        .iter()
        .map(|(category, arrays)| {
            let combined = balance_devices(arrays, rng);
            debug!(
                category = %category,
                sample_size = combined.len(),
                "Balanced ventilation sample"
            );
            ViolinSeries {
                category: category.clone(),
                sample_size: combined.len(),
                summary: density_summary(&combined, domain_max.unwrap_or(0.0)),
            }
        })
        .collect();

    info!(
        devices = config.device_count(),
        categories = samples.categories.len(),
        usable = series.len(),
        "Ventilation distributions computed"
    );

    VentilationChart {
        pollutant: config.key.clone(),
        title: format!("Indoor Air Pollution by Ventilation Method: {}", config.title),
        label: config.label.clone(),
        limits: config.limits.clone(),
        domain_max,
        series,
    }
}

/// Weekly pattern heatmap.
#[tracing::instrument(skip(rows, config), fields(pollutant = %config.key, rows = rows.len()))]
pub fn compute_heatmap(rows: &[RawRow], config: &PollutantConfig) -> HeatmapChart {
    let cells = heatmap_cells(rows, &config.internal_columns);
    info!(
        devices = config.device_count(),
        cells = cells.len(),
        "Heatmap computed"
    );

    HeatmapChart {
        pollutant: config.key.clone(),
        title: format!("Indoor Pollution by Time and Day: {}", config.title),
        label: config.label.clone(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(hour: u32, external: Option<f64>, internal: Option<f64>) -> RollingPoint {
        RollingPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            external,
            internal,
        }
    }

    #[test]
    fn test_overall_means_skip_nulls() {
        let points = vec![
            point(0, None, None),
            point(1, Some(2.0), Some(10.0)),
            point(2, Some(4.0), None),
        ];
        let bars = overall_means(&points);
        assert_eq!(bars[0].category, BarCategory::Outdoor);
        assert_eq!(bars[0].value, Some(3.0));
        assert_eq!(bars[1].category, BarCategory::Indoor);
        assert_eq!(bars[1].value, Some(10.0));
    }

    #[test]
    fn test_overall_means_all_null() {
        let bars = overall_means(&[point(0, None, None)]);
        assert!(bars.iter().all(|b| b.value.is_none()));
    }

    #[test]
    fn test_y_axis_max_includes_limit() {
        let points = vec![point(0, Some(8.0), None), point(1, None, Some(12.0))];
        assert!((y_axis_max(&points, None) - 13.2).abs() < 1e-9);
        assert!((y_axis_max(&points, Some(15.0)) - 16.5).abs() < 1e-9);
        assert_eq!(y_axis_max(&[], None), 0.0);
    }
}
