use crate::predict::PredictError;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Named model inputs in the column order the model was trained with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn new(columns: Vec<(String, f64)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

pub trait PriceModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError>;
}

/// Regression exported as `{"intercept": f64, "coefficients": {"<feature>": f64, ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearPriceModel {
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearPriceModel {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse model {}", path.display()))
    }
}

impl PriceModel for LinearPriceModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let mut out = self.intercept;
        for (name, value) in features.iter() {
            let coef = self
                .coefficients
                .get(name)
                .ok_or_else(|| PredictError::MissingCoefficient(name.to_string()))?;
            out += coef * value;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> LinearPriceModel {
        serde_json::from_value(json!({
            "intercept": 1000.0,
            "coefficients": {"Area": 200.0, "Floor": -10.0}
        }))
        .unwrap()
    }

    #[test]
    fn linear_prediction_sums_weighted_features() {
        let fv = FeatureVector::new(vec![("Area".to_string(), 50.0), ("Floor".to_string(), 3.0)]);
        assert_eq!(model().predict(&fv).unwrap(), 1000.0 + 200.0 * 50.0 - 30.0);
    }

    #[test]
    fn unknown_feature_is_an_error() {
        let fv = FeatureVector::new(vec![("Rooms".to_string(), 2.0)]);
        let err = model().predict(&fv).unwrap_err();
        assert!(matches!(err, PredictError::MissingCoefficient(name) if name == "Rooms"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price_model.json");
        std::fs::write(&path, r#"{"intercept": 1.5, "coefficients": {"Area": 2.0}}"#).unwrap();

        let m = LinearPriceModel::load(&path).unwrap();
        assert_eq!(m.intercept, 1.5);
        assert_eq!(m.coefficients.get("Area"), Some(&2.0));

        assert!(LinearPriceModel::load(&dir.path().join("missing.json")).is_err());
    }
}
