//! Tukey-fence outlier removal.

use crate::processing::utility::{quantile_sorted, sorted};

/// IQR multiplier of the fence.
pub const TUKEY_MULTIPLIER: f64 = 2.0;

/// Inclusive `[low, high]` fence for `values`, or `None` when empty.
pub fn tukey_fence(values: &[f64]) -> Option<(f64, f64)> {
    let ordered = sorted(values);
    let q1 = quantile_sorted(&ordered, 0.25)?;
    let q3 = quantile_sorted(&ordered, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - TUKEY_MULTIPLIER * iqr, q3 + TUKEY_MULTIPLIER * iqr))
}

/// Returns the values inside the Tukey fence, in their original order.
pub fn remove_outliers(values: &[f64]) -> Vec<f64> {
    let Some((low, high)) = tukey_fence(values) else {
        return Vec::new();
    };
    values
        .iter()
        .copied()
        .filter(|v| *v >= low && *v <= high)
        .collect()
}
