//! Fixed-bin histogram density and box statistics for violin plots.

use crate::processing::types::{DensityPoint, DensitySummary};
use crate::processing::utility::{quantile_sorted, sorted};

pub const BIN_COUNT: usize = 50;

/// Normalised histogram over `[0, domain_max)` split into [`BIN_COUNT`] bins.
///
/// Each bin covers `[start, start + width)`; density is
/// `count / (samples.len() * width)`. Returns no points for an empty sample
/// set or a non-positive domain.
pub fn histogram_density(samples: &[f64], domain_max: f64) -> Vec<DensityPoint> {
    if samples.is_empty() || !(domain_max.is_finite() && domain_max > 0.0) {
        return Vec::new();
    }

    let width = domain_max / BIN_COUNT as f64;
    let norm = samples.len() as f64 * width;
    let mut counts = [0usize; BIN_COUNT];

    for &v in samples {
        if v < 0.0 || v >= domain_max {
            continue;
        }
        let bin = ((v / width) as usize).min(BIN_COUNT - 1);
        counts[bin] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| DensityPoint {
            bin_start: i as f64 * width,
            density: count as f64 / norm,
        })
        .collect()
}

/// Density curve plus quartiles and extremes of `samples`.
pub fn density_summary(samples: &[f64], domain_max: f64) -> DensitySummary {
    let ordered = sorted(samples);
    DensitySummary {
        points: histogram_density(samples, domain_max),
        q1: quantile_sorted(&ordered, 0.25),
        median: quantile_sorted(&ordered, 0.5),
        q3: quantile_sorted(&ordered, 0.75),
        min: ordered.first().copied(),
        max: ordered.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples_yield_sentinel() {
        let summary = density_summary(&[], 10.0);
        assert_eq!(summary, DensitySummary::default());
        assert!(summary.median.is_none());
    }

    #[test]
    fn test_density_integrates_to_one() {
        let samples: Vec<f64> = (0..100).map(|v| v as f64 * 0.99).collect();
        let points = histogram_density(&samples, 100.0);
        assert_eq!(points.len(), BIN_COUNT);

        let width = 100.0 / BIN_COUNT as f64;
        let area: f64 = points.iter().map(|p| p.density * width).sum();
        assert!((area - 1.0).abs() < 1e-9);
        assert_eq!(points[0].bin_start, 0.0);
        assert!((points[1].bin_start - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_bins_are_half_open() {
        // width = 1.0: 1.0 belongs to bin 1, 50.0 falls outside the domain
        let points = histogram_density(&[0.5, 1.0, 50.0], 50.0);
        assert!((points[0].density - 1.0 / 3.0).abs() < 1e-12);
        assert!((points[1].density - 1.0 / 3.0).abs() < 1e-12);
        assert!(points[2..].iter().all(|p| p.density == 0.0));
    }

    #[test]
    fn test_degenerate_domain_has_no_points() {
        assert!(histogram_density(&[1.0], 0.0).is_empty());
        assert!(histogram_density(&[1.0], f64::NAN).is_empty());
    }

    #[test]
    fn test_box_statistics() {
        let summary = density_summary(&[5.0, 1.0, 3.0, 2.0, 4.0], 10.0);
        assert_eq!(summary.q1, Some(2.0));
        assert_eq!(summary.median, Some(3.0));
        assert_eq!(summary.q3, Some(4.0));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(5.0));
    }
}
