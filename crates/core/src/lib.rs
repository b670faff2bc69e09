pub mod analysis;
pub mod domain;
pub mod fx;
pub mod ingest;
pub mod predict;

pub mod config {
    use std::path::PathBuf;
    use std::time::Duration;

    const DEFAULT_HH_API_BASE_URL: &str = "https://api.hh.ru";
    const DEFAULT_USER_AGENT: &str = "hh-salary-analyzer/0.1";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_FETCH_DELAY_MS: u64 = 500;
    const DEFAULT_MODEL_PATH: &str = "model_artifacts/price_model.json";
    const DEFAULT_STATION_DATA_PATH: &str = "model_artifacts/station_data.json";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub hh_api_base_url: String,
        pub hh_user_agent: String,
        pub hh_timeout: Duration,
        pub hh_fetch_delay: Duration,
        pub model_path: PathBuf,
        pub station_data_path: PathBuf,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                hh_api_base_url: DEFAULT_HH_API_BASE_URL.to_string(),
                hh_user_agent: DEFAULT_USER_AGENT.to_string(),
                hh_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                hh_fetch_delay: Duration::from_millis(DEFAULT_FETCH_DELAY_MS),
                model_path: PathBuf::from(DEFAULT_MODEL_PATH),
                station_data_path: PathBuf::from(DEFAULT_STATION_DATA_PATH),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let timeout_secs = env_parse::<u64>("HH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
            let delay_ms = env_parse::<u64>("HH_FETCH_DELAY_MS")?.unwrap_or(DEFAULT_FETCH_DELAY_MS);

            Ok(Self {
                hh_api_base_url: env_non_empty("HH_API_BASE_URL")
                    .unwrap_or(defaults.hh_api_base_url),
                hh_user_agent: env_non_empty("HH_USER_AGENT").unwrap_or(defaults.hh_user_agent),
                hh_timeout: Duration::from_secs(timeout_secs),
                hh_fetch_delay: Duration::from_millis(delay_ms),
                model_path: env_non_empty("MODEL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.model_path),
                station_data_path: env_non_empty("STATION_DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.station_data_path),
                sentry_dsn: env_non_empty("SENTRY_DSN"),
            })
        }
    }

    fn env_non_empty(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    // Set but unparsable values are errors; unset ones fall back to defaults.
    fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env_non_empty(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("{key} is invalid ({raw:?}): {e}")),
            None => Ok(None),
        }
    }
}
