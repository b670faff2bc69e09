//! Salary normalization into rubles using a fixed rate table.

use std::collections::BTreeMap;
use thiserror::Error;

/// Approximate multipliers into rubles. `RUR` is the legacy code the listing API still emits.
const BUILTIN_RATES: &[(&str, f64)] = &[("RUR", 1.0), ("RUB", 1.0), ("USD", 80.0)];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown currency: {code}")]
pub struct UnknownCurrency {
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::from_pairs(BUILTIN_RATES.iter().copied())
    }
}

impl RateTable {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let rates = pairs
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect();
        Self { rates }
    }

    pub fn rate(&self, code: &str) -> Result<f64, UnknownCurrency> {
        self.rates.get(code).copied().ok_or_else(|| UnknownCurrency {
            code: code.to_string(),
        })
    }

    /// Converts `amount` into rubles.
    ///
    /// Absent amount or currency yields `None`. An unknown currency is logged and the amount
    /// is passed through unconverted rather than dropped.
    pub fn convert(&self, amount: Option<f64>, currency: Option<&str>) -> Option<f64> {
        let amount = amount?;
        let currency = currency?;

        match self.rate(currency) {
            Ok(rate) => Some(amount * rate),
            Err(err) => {
                tracing::warn!(currency = %err.code, amount, "{err}; salary left unconverted");
                Some(amount)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_multiply_by_rate() {
        let table = RateTable::default();
        assert_eq!(table.convert(Some(100.0), Some("USD")), Some(8000.0));
        assert_eq!(table.convert(Some(150_000.0), Some("RUR")), Some(150_000.0));
        assert_eq!(table.convert(Some(150_000.0), Some("RUB")), Some(150_000.0));
    }

    #[test]
    fn unknown_code_passes_amount_through() {
        let table = RateTable::default();
        assert_eq!(table.convert(Some(3000.0), Some("EUR")), Some(3000.0));
        assert_eq!(
            table.rate("KZT"),
            Err(UnknownCurrency {
                code: "KZT".to_string()
            })
        );
    }

    #[test]
    fn absent_inputs_yield_absent() {
        let table = RateTable::default();
        assert_eq!(table.convert(None, Some("USD")), None);
        assert_eq!(table.convert(Some(10.0), None), None);
        assert_eq!(table.convert(None, None), None);
    }

    #[test]
    fn custom_table_overrides_builtin_rates() {
        let table = RateTable::from_pairs([("EUR", 90.0)]);
        assert_eq!(table.convert(Some(2.0), Some("EUR")), Some(180.0));
        assert_eq!(table.convert(Some(2.0), Some("USD")), Some(2.0));
    }
}
