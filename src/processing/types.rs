//! Data types flowing through the chart pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::LimitThresholds;

/// One dataset row: column name to raw cell text.
pub type RawRow = HashMap<String, String>;

/// Wall-clock timestamp of a date bin.
pub type Timestamp = NaiveDateTime;

/// One date bin with the outdoor reading and the indoor device consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: Timestamp,
    pub external: Option<f64>,
    pub internal: Option<f64>,
}

/// Window-aggregated counterpart of an [`Observation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub date: Timestamp,
    pub external: Option<f64>,
    pub internal: Option<f64>,
}

impl RollingPoint {
    /// True when either channel lacks a value.
    pub fn is_gap(&self) -> bool {
        self.external.is_none() || self.internal.is_none()
    }
}

/// A maximal run of rolling points where at least one channel is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapInterval {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Admitted ventilation readings: category label to one sample array per device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VentilationSamples {
    pub device_count: usize,
    pub categories: BTreeMap<String, Vec<Vec<f64>>>,
}

impl VentilationSamples {
    pub fn new(device_count: usize) -> Self {
        Self {
            device_count,
            categories: BTreeMap::new(),
        }
    }

    /// Appends `value` to the `device` array of `category`, creating the category on first use.
    ///
    /// Readings for a device index at or beyond `device_count` are ignored.
    pub fn push(&mut self, category: &str, device: usize, value: f64) {
        if device >= self.device_count {
            return;
        }
        let device_count = self.device_count;
        let arrays = self
            .categories
            .entry(category.to_string())
            .or_insert_with(|| vec![Vec::new(); device_count]);
        arrays[device].push(value);
    }

    pub fn get(&self, category: &str) -> Option<&[Vec<f64>]> {
        self.categories.get(category).map(Vec::as_slice)
    }
}

/// One day-of-week by hour-of-day heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub day: String,
    pub hour: u32,
    pub value: f64,
    /// Number of devices consolidated into `value`.
    pub count: usize,
}

/// Histogram density at the start of one bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub bin_start: f64,
    pub density: f64,
}

/// Density curve plus box and whisker statistics for one violin.
///
/// An empty sample set yields no points and `None` for every statistic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DensitySummary {
    pub points: Vec<DensityPoint>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Category of the overall-mean bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarCategory {
    Outdoor,
    Indoor,
}

/// One bar of the overall-mean bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarValue {
    pub category: BarCategory,
    pub value: Option<f64>,
}

/// Rolling-mean line chart with the matching bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub pollutant: String,
    pub title: String,
    pub label: String,
    pub limits: LimitThresholds,
    pub points: Vec<RollingPoint>,
    pub gaps: Vec<GapInterval>,
    pub averages: Vec<BarValue>,
    pub y_max: f64,
}

/// One violin of the ventilation chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolinSeries {
    pub category: String,
    pub sample_size: usize,
    pub summary: DensitySummary,
}

/// Indoor distribution per ventilation method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VentilationChart {
    pub pollutant: String,
    pub title: String,
    pub label: String,
    pub limits: LimitThresholds,
    /// Shared value axis `[0, domain_max]`.
    pub domain_max: Option<f64>,
    pub series: Vec<ViolinSeries>,
}

/// Weekly pattern heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapChart {
    pub pollutant: String,
    pub title: String,
    pub label: String,
    pub cells: Vec<HeatmapCell>,
}

/// Summary entry for the published chart index.
#[derive(Debug, Serialize)]
pub struct ChartIndexEntry {
    pub pollutant: String,
    pub title: String,
    pub charts: Vec<String>,
}

/// Top-level index of all published charts, served as `{prefix}/index.json`.
#[derive(Debug, Serialize)]
pub struct ChartIndex {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub pollutants: Vec<ChartIndexEntry>,
}
