use crate::config::Settings;
use crate::domain::vacancy::VacancyRecord;
use crate::fx::RateTable;
use crate::ingest::types::{NamedRef, SearchPage, SearchQuery, VacancyItem};
use anyhow::Context;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const SEARCH_PATH: &str = "/vacancies";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("listing API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("listing API HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("listing API response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait VacancySource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Fetches and normalizes one page of listings. Failures are logged and yield an empty Vec.
    async fn fetch(&self, query: &SearchQuery) -> Vec<VacancyRecord>;
}

#[derive(Debug, Clone)]
pub struct HhVacancyFetcher {
    http: reqwest::Client,
    base_url: String,
    delay: Duration,
    rates: RateTable,
}

impl HhVacancyFetcher {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.hh_user_agent.as_str())
            .timeout(settings.hh_timeout)
            .build()
            .context("failed to build listing API http client")?;

        Ok(Self {
            http,
            base_url: settings.hh_api_base_url.clone(),
            delay: settings.hh_fetch_delay,
            rates: RateTable::default(),
        })
    }

    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }

    /// Single request for page 0, no retries.
    pub async fn try_fetch(&self, query: &SearchQuery) -> Result<SearchPage, FetchError> {
        let res = self
            .http
            .get(self.url())
            .query(&query.params())
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(serde_json::from_str::<SearchPage>(&text)?)
    }

    pub fn to_record(&self, item: &VacancyItem) -> VacancyRecord {
        let (salary_from, salary_to, currency) = match &item.salary {
            Some(s) => (s.from, s.to, s.currency.clone()),
            None => (None, None, None),
        };

        VacancyRecord {
            name: item.name.clone().unwrap_or_default(),
            employer: ref_name(&item.employer),
            salary_from,
            salary_to,
            salary_from_rub: self.rates.convert(salary_from, currency.as_deref()),
            salary_to_rub: self.rates.convert(salary_to, currency.as_deref()),
            currency,
            experience: ref_name(&item.experience),
            schedule: ref_name(&item.schedule),
            url: item.alternate_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl VacancySource for HhVacancyFetcher {
    fn source_name(&self) -> &'static str {
        "hh"
    }

    async fn fetch(&self, query: &SearchQuery) -> Vec<VacancyRecord> {
        tracing::info!(
            text = %query.text,
            area = query.area,
            per_page = query.per_page,
            "searching vacancies"
        );

        let page = match self.try_fetch(query).await {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(source = self.source_name(), error = %err, "vacancy fetch failed; no data");
                return Vec::new();
            }
        };

        tracing::info!(found = page.found, loading = page.items.len(), "vacancy page received");

        let records = page.items.iter().map(|item| self.to_record(item)).collect();

        // Courtesy pause towards the remote API, unconditional.
        tokio::time::sleep(self.delay).await;

        records
    }
}

fn ref_name(r: &Option<NamedRef>) -> Option<String> {
    r.as_ref().and_then(|r| r.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn fetcher(base_url: String) -> HhVacancyFetcher {
        fetcher_with_delay(base_url, Duration::ZERO)
    }

    fn fetcher_with_delay(base_url: String, delay: Duration) -> HhVacancyFetcher {
        let settings = Settings {
            hh_api_base_url: base_url,
            hh_fetch_delay: delay,
            ..Settings::default()
        };
        HhVacancyFetcher::from_settings(&settings).unwrap()
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fixture() -> Value {
        json!({
            "found": 2,
            "items": [
                {
                    "name": "Data Scientist",
                    "employer": {"name": "Acme"},
                    "salary": {"from": 100, "to": 200, "currency": "USD"},
                    "experience": {"name": "От 1 года до 3 лет"},
                    "schedule": {"name": "Полный день"},
                    "alternate_url": "https://hh.ru/vacancy/1"
                },
                {
                    "name": "ML Engineer",
                    "employer": {"name": "Acme"},
                    "salary": null,
                    "experience": {"name": "Нет опыта"},
                    "schedule": {"name": "Удаленная работа"},
                    "alternate_url": "https://hh.ru/vacancy/2"
                }
            ]
        })
    }

    fn item(v: Value) -> VacancyItem {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn converts_both_bounds_with_item_currency() {
        let f = fetcher("http://unused".to_string());
        let rec = f.to_record(&item(json!({
            "name": "DS",
            "salary": {"from": 100, "to": 200, "currency": "USD"}
        })));
        assert_eq!(rec.salary_from_rub, Some(8000.0));
        assert_eq!(rec.salary_to_rub, Some(16000.0));
        assert_eq!(rec.salary_avg_rub(), Some(12000.0));
        assert_eq!(rec.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn single_bound_rub_salary() {
        let f = fetcher("http://unused".to_string());
        let rec = f.to_record(&item(json!({
            "name": "DS",
            "salary": {"from": 100000, "currency": "RUB"}
        })));
        assert_eq!(rec.salary_from_rub, Some(100000.0));
        assert_eq!(rec.salary_to_rub, None);
        assert_eq!(rec.salary_avg_rub(), Some(100000.0));
    }

    #[test]
    fn unknown_currency_keeps_original_amount() {
        let f = fetcher("http://unused".to_string());
        let rec = f.to_record(&item(json!({
            "name": "DS",
            "salary": {"from": 5000, "to": null, "currency": "EUR"}
        })));
        assert_eq!(rec.salary_from_rub, Some(5000.0));
        assert_eq!(rec.salary_to_rub, None);
    }

    #[test]
    fn custom_rate_table_converts_extra_currency() {
        let f = fetcher("http://unused".to_string())
            .with_rates(RateTable::from_pairs([("RUR", 1.0), ("EUR", 100.0)]));
        let rec = f.to_record(&item(json!({
            "name": "DS",
            "salary": {"from": 1000, "to": 2000, "currency": "EUR"}
        })));
        assert_eq!(rec.salary_from_rub, Some(100_000.0));
        assert_eq!(rec.salary_to_rub, Some(200_000.0));

        // USD is not in the custom table, so the amount passes through.
        let rec = f.to_record(&item(json!({
            "name": "DS",
            "salary": {"from": 100, "currency": "USD"}
        })));
        assert_eq!(rec.salary_from_rub, Some(100.0));
    }

    #[test]
    fn item_without_salary_or_refs_maps_to_empty_fields() {
        let f = fetcher("http://unused".to_string());
        let rec = f.to_record(&item(json!({"name": "Analyst"})));
        assert_eq!(rec.name, "Analyst");
        assert_eq!(rec.employer, None);
        assert_eq!(rec.currency, None);
        assert_eq!(rec.salary_from_rub, None);
        assert_eq!(rec.salary_to_rub, None);
        assert_eq!(rec.experience, None);
        assert_eq!(rec.url, None);
    }

    #[tokio::test]
    async fn fetches_first_page_and_normalizes_items() {
        let app = Router::new().route(
            "/vacancies",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let ok = params.get("page").map(String::as_str) == Some("0")
                    && params.get("text").map(String::as_str) == Some("data scientist")
                    && params.get("area").map(String::as_str) == Some("1")
                    && params.get("per_page").map(String::as_str) == Some("50");
                if ok {
                    Ok(Json(fixture()))
                } else {
                    Err(AxumStatus::BAD_REQUEST)
                }
            }),
        );
        let base = serve(app).await;

        let records = fetcher(base).fetch(&SearchQuery::default()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].employer.as_deref(), Some("Acme"));
        assert_eq!(records[0].salary_to_rub, Some(16000.0));
        assert_eq!(records[1].currency, None);
        assert_eq!(records[1].url.as_deref(), Some("https://hh.ru/vacancy/2"));
    }

    #[tokio::test]
    async fn http_error_yields_empty_result() {
        let app = Router::new().route(
            "/vacancies",
            get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let f = fetcher(serve(app).await);

        let err = f.try_fetch(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));

        assert!(f.fetch(&SearchQuery::default()).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_yields_empty_result() {
        let app = Router::new().route("/vacancies", get(|| async { "<html>captcha</html>" }));
        let f = fetcher(serve(app).await);

        let err = f.try_fetch(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(f.fetch(&SearchQuery::default()).await.is_empty());
    }

    #[tokio::test]
    async fn connection_failure_yields_empty_result() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let f = fetcher(format!("http://{addr}"));
        let err = f.try_fetch(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(f.fetch(&SearchQuery::default()).await.is_empty());
    }

    #[tokio::test]
    async fn pauses_after_a_successful_page_but_not_after_a_failure() {
        let delay = Duration::from_millis(300);

        let ok = Router::new().route("/vacancies", get(|| async { Json(fixture()) }));
        let f = fetcher_with_delay(serve(ok).await, delay);
        let started = std::time::Instant::now();
        assert_eq!(f.fetch(&SearchQuery::default()).await.len(), 2);
        assert!(started.elapsed() >= delay);

        let failing = Router::new().route(
            "/vacancies",
            get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let f = fetcher_with_delay(serve(failing).await, delay);
        let started = std::time::Instant::now();
        assert!(f.fetch(&SearchQuery::default()).await.is_empty());
        assert!(started.elapsed() < delay);
    }
}
