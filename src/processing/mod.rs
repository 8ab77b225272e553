//! Sensor data aggregation for the dashboard charts.
//!
//! Raw rows are turned into rolling means and gaps for the trend chart,
//! outlier-filtered and device-balanced distributions for the ventilation
//! violins, and weekday by hour medians for the heatmap.

pub mod density;
pub mod heatmap;
pub mod outliers;
pub mod rolling;
pub mod types;
pub mod utility;
pub mod ventilation;
