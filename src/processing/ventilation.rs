//! Indoor readings grouped by ventilation method, balanced across devices.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::{ventilation_time_column, ventilation_type_column};
use crate::parser::cell_value;
use crate::processing::outliers::remove_outliers;
use crate::processing::types::{RawRow, VentilationSamples};
use crate::processing::utility::sorted;

/// Minimum ventilation duration (minutes) for a reading to be admitted.
pub const MIN_VENTILATION_MINUTES: f64 = 30.0;

/// Display order of the known ventilation categories.
pub const CATEGORY_ORDER: &[&str] = &["no ventilation", "1 window", "2 windows"];

/// Collects admitted `(category, value)` pairs per device.
///
/// Device `d` reads its value from `internal_columns[d]` and its ventilation
/// type and duration from the positionally paired columns. A reading is
/// admitted when the value is positive, the type is non-empty and the duration
/// is at least [`MIN_VENTILATION_MINUTES`].
pub fn collect_samples(rows: &[RawRow], internal_columns: &[String]) -> VentilationSamples {
    let mut samples = VentilationSamples::new(internal_columns.len());
    let type_columns: Vec<String> = (0..internal_columns.len())
        .map(ventilation_type_column)
        .collect();
    let time_columns: Vec<String> = (0..internal_columns.len())
        .map(ventilation_time_column)
        .collect();

    for row in rows {
        for (device, column) in internal_columns.iter().enumerate() {
            let Some(value) = cell_value(row, column).filter(|v| *v > 0.0) else {
                continue;
            };
            let Some(category) = row
                .get(&type_columns[device])
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            let long_enough = cell_value(row, &time_columns[device])
                .is_some_and(|minutes| minutes >= MIN_VENTILATION_MINUTES);
            if !long_enough {
                continue;
            }

            samples.push(category, device, value);
        }
    }

    samples
}

/// True when every device contributed at least one reading.
pub fn has_all_devices(arrays: &[Vec<f64>]) -> bool {
    !arrays.is_empty() && arrays.iter().all(|a| !a.is_empty())
}

/// Applies the all-devices gate, then outlier-filters and sorts each device array.
pub fn clean_category(arrays: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    if !has_all_devices(arrays) {
        return None;
    }
    Some(arrays.iter().map(|a| sorted(&remove_outliers(a))).collect())
}

/// Draws `min(len)` values without replacement from every device and concatenates them.
pub fn balance_devices<R: Rng + ?Sized>(arrays: &[Vec<f64>], rng: &mut R) -> Vec<f64> {
    let Some(per_device) = arrays.iter().map(Vec::len).min() else {
        return Vec::new();
    };

    let mut combined = Vec::with_capacity(per_device * arrays.len());
    for array in arrays {
        combined.extend(array.choose_multiple(rng, per_device).copied());
    }
    combined
}

/// Categories of `samples` in display order: known labels first, then the rest alphabetically.
pub fn ordered_categories(samples: &VentilationSamples) -> Vec<&str> {
    let mut out: Vec<&str> = CATEGORY_ORDER
        .iter()
        .copied()
        .filter(|c| samples.categories.contains_key(*c))
        .collect();
    out.extend(
        samples
            .categories
            .keys()
            .map(String::as_str)
            .filter(|c| !CATEGORY_ORDER.contains(c)),
    );
    out
}

/// Cleaned device arrays for every category passing the all-devices gate, in display order.
pub fn usable_categories(samples: &VentilationSamples) -> Vec<(String, Vec<Vec<f64>>)> {
    let mut out = Vec::new();
    for category in ordered_categories(samples) {
        let Some(arrays) = samples.get(category) else {
            continue;
        };
        match clean_category(arrays) {
            Some(cleaned) => out.push((category.to_string(), cleaned)),
            None => debug!(category, "Ventilation category lacks readings from some devices"),
        }
    }
    out
}
