use serde::Serialize;

/// One listing, normalized. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacancyRecord {
    pub name: String,
    pub employer: Option<String>,
    pub salary_from: Option<f64>,
    pub salary_to: Option<f64>,
    pub salary_from_rub: Option<f64>,
    pub salary_to_rub: Option<f64>,
    pub currency: Option<String>,
    pub experience: Option<String>,
    pub schedule: Option<String>,
    pub url: Option<String>,
}

impl VacancyRecord {
    /// Average of the ruble bounds, or the single bound when only one is known.
    pub fn salary_avg_rub(&self) -> Option<f64> {
        match (self.salary_from_rub, self.salary_to_rub) {
            (Some(from), Some(to)) => Some((from + to) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }
}
