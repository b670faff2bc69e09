pub mod provider;
pub mod types;

pub use provider::{FetchError, HhVacancyFetcher, VacancySource};
pub use types::SearchQuery;
