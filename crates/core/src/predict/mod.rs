//! Apartment price prediction shared by the HTTP service and the CLI.

pub mod model;
pub mod stations;

use crate::config::Settings;
use model::{FeatureVector, LinearPriceModel, PriceModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stations::{StationCatalog, StationClass};
use std::sync::Arc;
use thiserror::Error;

pub const AREA: &str = "Area";
pub const ROOMS: &str = "Number of rooms";
pub const MINUTES_TO_METRO: &str = "Minutes to metro";
pub const FLOOR: &str = "Floor";
pub const TOTAL_FLOORS: &str = "Number of floors";
pub const IS_PREMIUM_STATION: &str = "is_premium_station";
pub const IS_BUDGET_STATION: &str = "is_budget_station";

const DEFAULT_FEATURE_ORDER: [&str; 7] = [
    AREA,
    ROOMS,
    MINUTES_TO_METRO,
    FLOOR,
    TOTAL_FLOORS,
    IS_PREMIUM_STATION,
    IS_BUDGET_STATION,
];

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model expects unknown feature {0:?}")]
    UnknownFeature(String),

    #[error("model has no coefficient for feature {0:?}")]
    MissingCoefficient(String),

    #[error("model produced a non-finite prediction ({0})")]
    NonFiniteOutput(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentFeatures {
    pub area: f64,
    pub rooms: f64,
    pub minutes_to_metro: f64,
    pub floor: f64,
    pub total_floors: f64,
    pub metro_station: Option<String>,
}

impl ApartmentFeatures {
    /// Reads a request object. Numeric fields accept JSON numbers or numeric strings.
    pub fn from_json(v: &Value) -> Result<Self, PredictError> {
        let obj = v
            .as_object()
            .ok_or_else(|| PredictError::InvalidInput("request body must be a JSON object".into()))?;

        let metro_station = match obj.get("metro_station") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(PredictError::InvalidInput(format!(
                    "metro_station must be a string, got {other}"
                )))
            }
        };

        Ok(Self {
            area: number_field(v, "area")?,
            rooms: number_field(v, "rooms")?,
            minutes_to_metro: number_field(v, "minutes_to_metro")?,
            floor: number_field(v, "floor")?,
            total_floors: number_field(v, "total_floors")?,
            metro_station,
        })
    }
}

fn number_field(v: &Value, key: &str) -> Result<f64, PredictError> {
    match v.get(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PredictError::InvalidInput(format!("{key} is out of range"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PredictError::InvalidInput(format!("{key} is not a number: {s:?}"))),
        Some(other) => Err(PredictError::InvalidInput(format!(
            "{key} must be a number, got {other}"
        ))),
        None => Err(PredictError::InvalidInput(format!("missing field {key:?}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub predicted_price: i64,
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn ok(predicted_price: i64) -> Self {
        Self {
            success: true,
            predicted_price,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            predicted_price: 0,
            error: Some(message.into()),
        }
    }
}

/// Loaded model plus station data. Built once and shared.
#[derive(Clone)]
pub struct PricePredictor {
    model: Arc<dyn PriceModel>,
    stations: StationCatalog,
}

impl std::fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePredictor")
            .field("stations", &self.stations)
            .finish_non_exhaustive()
    }
}

impl PricePredictor {
    pub fn new(model: Arc<dyn PriceModel>, stations: StationCatalog) -> Self {
        Self { model, stations }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let model = LinearPriceModel::load(&settings.model_path)?;
        let stations = StationCatalog::load(&settings.station_data_path)?;

        for name in feature_order(&stations) {
            anyhow::ensure!(
                model.coefficients.contains_key(name),
                "model {} has no coefficient for feature {name:?}",
                settings.model_path.display()
            );
        }

        tracing::info!(
            model = %settings.model_path.display(),
            premium_stations = stations.premium_stations.len(),
            budget_stations = stations.budget_stations.len(),
            "price model loaded"
        );
        Ok(Self::new(Arc::new(model), stations))
    }

    pub fn features(&self, input: &ApartmentFeatures) -> Result<FeatureVector, PredictError> {
        let class = self.stations.classify(input.metro_station.as_deref());
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        let columns = feature_order(&self.stations)
            .into_iter()
            .map(|name| {
                let value = match name {
                    AREA => input.area,
                    ROOMS => input.rooms,
                    MINUTES_TO_METRO => input.minutes_to_metro,
                    FLOOR => input.floor,
                    TOTAL_FLOORS => input.total_floors,
                    IS_PREMIUM_STATION => flag(class == StationClass::Premium),
                    IS_BUDGET_STATION => flag(class == StationClass::Budget),
                    other => return Err(PredictError::UnknownFeature(other.to_string())),
                };
                Ok((name.to_string(), value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector::new(columns))
    }

    /// Predicted price, truncated toward zero.
    pub fn predict(&self, input: &ApartmentFeatures) -> Result<i64, PredictError> {
        let features = self.features(input)?;
        let price = self.model.predict(&features)?;
        if !price.is_finite() {
            return Err(PredictError::NonFiniteOutput(price));
        }
        Ok(price.trunc() as i64)
    }

    /// Request boundary: every failure becomes a structured response, never an error.
    pub fn respond(&self, body: &[u8]) -> PredictResponse {
        let result = serde_json::from_slice::<Value>(body)
            .map_err(|e| PredictError::InvalidInput(format!("body is not valid JSON: {e}")))
            .and_then(|v| ApartmentFeatures::from_json(&v))
            .and_then(|input| self.predict(&input));

        match result {
            Ok(price) => PredictResponse::ok(price),
            Err(err) => {
                tracing::warn!(error = %err, "prediction failed");
                PredictResponse::failure(err.to_string())
            }
        }
    }
}

fn feature_order(stations: &StationCatalog) -> Vec<&str> {
    if stations.features.is_empty() {
        DEFAULT_FEATURE_ORDER.to_vec()
    } else {
        stations.features.iter().map(String::as_str).collect()
    }
}
