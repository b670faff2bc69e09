use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationClass {
    Premium,
    Budget,
    Other,
}

/// Station category lists plus the model's feature column order, as shipped in
/// `station_data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationCatalog {
    #[serde(default)]
    pub premium_stations: HashSet<String>,
    #[serde(default)]
    pub budget_stations: HashSet<String>,
    /// Column order expected by the model; empty means the built-in order.
    #[serde(default)]
    pub features: Vec<String>,
}

impl StationCatalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read station data {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse station data {}", path.display()))
    }

    /// Premium wins over budget. Blank or absent names are `Other`.
    pub fn classify(&self, station: Option<&str>) -> StationClass {
        let Some(name) = station.map(str::trim).filter(|s| !s.is_empty()) else {
            return StationClass::Other;
        };

        if self.premium_stations.contains(name) {
            StationClass::Premium
        } else if self.budget_stations.contains(name) {
            StationClass::Budget
        } else {
            StationClass::Other
        }
    }
}
