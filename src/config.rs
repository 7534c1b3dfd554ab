//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a usable configuration pointing at `data/processed`.
use crate::error::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Staple goods used by the "Essential" commodity filter.
pub static ESSENTIAL_COMMODITIES: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Sugar",
        "Wheat flour",
        "Eggs",
        "Potatoes",
        "Salt",
        "Fuel (diesel)",
        "Tomatoes",
        "Rice",
        "Oil (vegetable)",
        "Onions",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

static DEFAULT_COUNTRIES: Lazy<Vec<String>> = Lazy::new(|| {
    ["Afghanistan", "Armenia", "Bangladesh", "Guinea"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub data_dir: PathBuf,
    pub prices_file: String,
    pub nutrition_file: String,
    pub affordability_file: String,
    pub output_dir: PathBuf,
    pub essential_commodities: Vec<String>,
    pub default_countries: Vec<String>,
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/processed"),
            prices_file: "wfp_preprocessed.csv".to_string(),
            nutrition_file: "FAOSTAT_data_en_nutrition.csv".to_string(),
            affordability_file: "affordability_index.csv".to_string(),
            output_dir: PathBuf::from("."),
            essential_commodities: ESSENTIAL_COMMODITIES.clone(),
            default_countries: DEFAULT_COUNTRIES.clone(),
            top_n: 20,
            histogram_bins: 30,
        }
    }
}

impl MonitorConfig {
    /// Read a JSON config file; missing fields fall back to defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn prices_path(&self) -> PathBuf {
        self.data_dir.join(&self.prices_file)
    }

    pub fn nutrition_path(&self) -> PathBuf {
        self.data_dir.join(&self.nutrition_file)
    }

    pub fn affordability_path(&self) -> PathBuf {
        self.data_dir.join(&self.affordability_file)
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            essential_commodities: self.essential_commodities.iter().cloned().collect(),
            top_n: self.top_n,
            histogram_bins: self.histogram_bins.max(1),
        }
    }
}

/// Static parameters the engine needs besides the datasets themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    pub essential_commodities: BTreeSet<String>,
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        MonitorConfig::default().query_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: MonitorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.top_n, 20);
        assert_eq!(config.essential_commodities.len(), 10);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"top_n": 5, "essential_commodities": ["Rice"]}"#).unwrap();
        let settings = config.query_settings();
        assert_eq!(settings.top_n, 5);
        assert!(settings.essential_commodities.contains("Rice"));
        assert!(!settings.essential_commodities.contains("Sugar"));
        assert_eq!(settings.histogram_bins, 30);
    }

    #[test]
    fn paths_join_data_dir() {
        let config = MonitorConfig {
            data_dir: PathBuf::from("/tmp/d"),
            ..MonitorConfig::default()
        };
        assert_eq!(config.prices_path(), PathBuf::from("/tmp/d/wfp_preprocessed.csv"));
    }
}
