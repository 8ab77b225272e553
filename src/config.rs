//! Pollutant to column-name configuration.
//!
//! The builtin table mirrors the dashboard defaults; a JSON file with the
//! same shape can replace it:
//! ```json
//! {
//!   "pm25": {
//!     "title": "PM2.5",
//!     "label": "PM2.5 (µg/m³)",
//!     "period": "24-hour",
//!     "external_column": "EXT_PM2.5",
//!     "internal_columns": ["PM2.5_DEVICE_1", "PM2.5_DEVICE_2"],
//!     "limits": { "daily_limit": 15, "yearly_limit": 5 }
//!   }
//! }
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column holding the date-bin timestamp of each row.
pub const DATE_COLUMN: &str = "date_bin";

/// Upper bound on indoor devices per pollutant.
pub const MAX_DEVICES: usize = 5;

/// Ventilation-type column paired with device index `device` (0-based).
pub fn ventilation_type_column(device: usize) -> String {
    format!("VENT_TYPE_DEVICE_{}", device + 1)
}

/// Ventilation-duration column paired with device index `device` (0-based).
pub fn ventilation_time_column(device: usize) -> String {
    format!("VENT_TIME_DEVICE_{}", device + 1)
}

/// Guideline values forwarded to the charts for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitThresholds {
    #[serde(default)]
    pub daily_limit: Option<f64>,
    #[serde(default)]
    pub yearly_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantConfig {
    #[serde(default)]
    pub key: String,
    pub title: String,
    pub label: String,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default)]
    pub external_column: Option<String>,
    pub internal_columns: Vec<String>,
    #[serde(default)]
    pub limits: LimitThresholds,
}

fn default_period() -> String {
    "24-hour".to_string()
}

impl PollutantConfig {
    fn builtin(
        key: &str,
        title: &str,
        label: &str,
        external: &str,
        device_prefix: &str,
        daily: f64,
        yearly: f64,
    ) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            label: label.to_string(),
            period: default_period(),
            external_column: Some(external.to_string()),
            internal_columns: (1..=MAX_DEVICES)
                .map(|i| format!("{device_prefix}_DEVICE_{i}"))
                .collect(),
            limits: LimitThresholds {
                daily_limit: Some(daily),
                yearly_limit: Some(yearly),
            },
        }
    }

    pub fn device_count(&self) -> usize {
        self.internal_columns.len()
    }

    fn validate(&self) -> Result<()> {
        let n = self.internal_columns.len();
        if n == 0 || n > MAX_DEVICES {
            bail!(
                "pollutant {:?}: expected 1..={} internal columns, got {}",
                self.key,
                MAX_DEVICES,
                n
            );
        }
        Ok(())
    }
}

/// All configured pollutants, keyed by pollutant key (`pm25`, `pm10`, `no2`).
#[derive(Debug, Clone)]
pub struct PollutantCatalog {
    entries: BTreeMap<String, PollutantConfig>,
}

impl PollutantCatalog {
    pub fn builtin() -> Self {
        let entries = [
            PollutantConfig::builtin(
                "pm25",
                "PM2.5",
                "PM2.5 (µg/m³)",
                "EXT_PM2.5",
                "PM2.5",
                15.0,
                5.0,
            ),
            PollutantConfig::builtin(
                "pm10",
                "PM10",
                "PM10 (µg/m³)",
                "EXT_PM10",
                "PM10",
                45.0,
                15.0,
            ),
            PollutantConfig::builtin(
                "no2",
                "NO₂",
                "NO₂ (µg/m³)",
                "EXT_NO2",
                "NO2",
                25.0,
                10.0,
            ),
        ]
        .into_iter()
        .map(|c| (c.key.clone(), c))
        .collect();
        Self { entries }
    }

    /// Loads the catalog from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let mut entries: BTreeMap<String, PollutantConfig> = serde_json::from_str(content)?;
        for (key, config) in entries.iter_mut() {
            config.key = key.clone();
            config.validate()?;
        }
        Ok(Self { entries })
    }

    /// Returns the configuration for `key`, if one exists.
    pub fn get(&self, key: &str) -> Option<&PollutantConfig> {
        self.entries.get(key)
    }

    /// Like [`get`](Self::get) but fails with the list of known keys.
    pub fn require(&self, key: &str) -> Result<&PollutantConfig> {
        match self.entries.get(key) {
            Some(config) => Ok(config),
            None => bail!(
                "unknown pollutant {:?} (known: {})",
                key,
                self.entries.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PollutantConfig> {
        self.entries.values()
    }
}

impl Default for PollutantCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PollutantCatalog::builtin();
        let pm25 = catalog.get("pm25").unwrap();
        assert_eq!(pm25.external_column.as_deref(), Some("EXT_PM2.5"));
        assert_eq!(pm25.internal_columns[0], "PM2.5_DEVICE_1");
        assert_eq!(pm25.device_count(), 5);
        assert_eq!(pm25.limits.daily_limit, Some(15.0));
        assert_eq!(catalog.get("no2").unwrap().internal_columns[4], "NO2_DEVICE_5");
        assert_eq!(catalog.iter().count(), 3);
    }

    #[test]
    fn test_from_json_sets_keys_and_defaults() {
        let json = r#"{
            "co2": {
                "title": "CO2",
                "label": "CO2 (ppm)",
                "internal_columns": ["CO2_DEVICE_1", "CO2_DEVICE_2"]
            }
        }"#;
        let catalog = PollutantCatalog::from_json(json).unwrap();
        let co2 = catalog.require("co2").unwrap();
        assert_eq!(co2.key, "co2");
        assert_eq!(co2.period, "24-hour");
        assert!(co2.external_column.is_none());
        assert_eq!(co2.limits, LimitThresholds::default());
    }

    #[test]
    fn test_from_json_rejects_too_many_devices() {
        let json = r#"{
            "x": {
                "title": "X",
                "label": "X",
                "internal_columns": ["a", "b", "c", "d", "e", "f"]
            }
        }"#;
        assert!(PollutantCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_require_unknown_key() {
        let err = PollutantCatalog::builtin().require("o3").unwrap_err();
        assert!(err.to_string().contains("pm25"));
    }

    #[test]
    fn test_ventilation_columns_are_positional() {
        assert_eq!(ventilation_type_column(0), "VENT_TYPE_DEVICE_1");
        assert_eq!(ventilation_time_column(4), "VENT_TIME_DEVICE_5");
    }
}
