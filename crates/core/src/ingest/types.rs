use serde::Deserialize;

/// Search parameters. Only the first result page is ever requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Region code: 1 is Moscow, 2 is St Petersburg.
    pub area: u32,
    pub per_page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: "data scientist".to_string(),
            area: 1,
            per_page: 50,
        }
    }
}

impl SearchQuery {
    pub fn params(&self) -> [(&'static str, String); 4] {
        [
            ("text", self.text.clone()),
            ("area", self.area.to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", "0".to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub items: Vec<VacancyItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VacancyItem {
    pub name: Option<String>,
    pub employer: Option<NamedRef>,
    pub salary: Option<SalaryInfo>,
    pub experience: Option<NamedRef>,
    pub schedule: Option<NamedRef>,
    pub alternate_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalaryInfo {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub currency: Option<String>,
}
