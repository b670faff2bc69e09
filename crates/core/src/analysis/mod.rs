pub mod chart;
pub mod export;
pub mod report;
pub mod stats;

use crate::domain::vacancy::VacancyRecord;
use report::{AnalysisReport, ExperienceStats, SalaryStats};
use stats::{value_counts, Summary};
use std::collections::BTreeMap;
use std::path::Path;

/// Outlier clipping bounds for `salary_avg_rub`, both inclusive.
pub const SALARY_FLOOR_RUB: f64 = 10_000.0;
pub const SALARY_CEILING_RUB: f64 = 1_000_000.0;

const TOP_EMPLOYERS: usize = 10;
const PREVIEW_ROWS: usize = 5;

/// A salary-bearing record together with its derived average. Records are never mutated.
#[derive(Debug, Clone, Copy)]
pub struct SalaryView<'a> {
    pub record: &'a VacancyRecord,
    pub salary_avg_rub: f64,
}

/// Records with at least one ruble bound, paired with their average.
pub fn salary_views(records: &[VacancyRecord]) -> Vec<SalaryView<'_>> {
    records
        .iter()
        .filter_map(|record| {
            record.salary_avg_rub().map(|salary_avg_rub| SalaryView {
                record,
                salary_avg_rub,
            })
        })
        .collect()
}

pub fn clean(views: Vec<SalaryView<'_>>) -> Vec<SalaryView<'_>> {
    views
        .into_iter()
        .filter(|v| (SALARY_FLOOR_RUB..=SALARY_CEILING_RUB).contains(&v.salary_avg_rub))
        .collect()
}

/// Output of [`analyze`]: the report plus the full, unfiltered record set for export.
#[derive(Debug)]
pub struct Analysis<'a> {
    pub report: AnalysisReport,
    pub records: &'a [VacancyRecord],
}

impl Analysis<'_> {
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        export::write_vacancies_csv(self.records, path)
    }
}

/// Builds the report and, when clipped salaries remain and `chart_path` is given, the chart.
/// A chart that fails to render is logged and leaves `chart_path` unset.
///
/// Returns `None` without touching the filesystem when `records` is empty.
pub fn analyze<'a>(
    records: &'a [VacancyRecord],
    chart_path: Option<&Path>,
) -> Option<Analysis<'a>> {
    if records.is_empty() {
        tracing::warn!("no data to analyze");
        return None;
    }

    let views = salary_views(records);
    let cleaned = clean(views.clone());
    let mut report = summarize(records, &views, &cleaned);

    if let Some(path) = chart_path.filter(|_| !cleaned.is_empty()) {
        let data = chart::ChartData {
            salaries: cleaned.iter().map(|v| v.salary_avg_rub).collect(),
            experience: value_counts(records.iter().filter_map(|r| r.experience.as_deref())),
            currencies: report.currencies.clone(),
        };
        match chart::render(&data, path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "chart saved");
                report.chart_path = Some(path.to_path_buf());
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "chart rendering failed");
            }
        }
    }

    Some(Analysis { report, records })
}

fn summarize(
    records: &[VacancyRecord],
    views: &[SalaryView<'_>],
    cleaned: &[SalaryView<'_>],
) -> AnalysisReport {
    let mut top_employers = value_counts(records.iter().filter_map(|r| r.employer.as_deref()));
    top_employers.truncate(TOP_EMPLOYERS);

    let currencies = value_counts(views.iter().filter_map(|v| v.record.currency.as_deref()));

    let salaries: Vec<f64> = cleaned.iter().map(|v| v.salary_avg_rub).collect();

    AnalysisReport {
        total: records.len(),
        preview: records.iter().take(PREVIEW_ROWS).cloned().collect(),
        top_employers,
        currencies,
        salary: Summary::of(&salaries).map(SalaryStats::from),
        by_experience: experience_stats(cleaned),
        chart_path: None,
    }
}

/// Salary stats per experience bracket, keys sorted, rounded to whole rubles.
/// Views with no experience label are skipped.
fn experience_stats(cleaned: &[SalaryView<'_>]) -> Vec<ExperienceStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for v in cleaned {
        if let Some(exp) = v.record.experience.as_deref() {
            groups.entry(exp).or_default().push(v.salary_avg_rub);
        }
    }

    groups
        .into_iter()
        .filter_map(|(experience, values)| {
            let s = Summary::of(&values)?;
            Some(ExperienceStats {
                experience: experience.to_string(),
                mean: s.mean.round_ties_even(),
                count: s.count,
                min: s.min.round_ties_even(),
                max: s.max.round_ties_even(),
            })
        })
        .collect()
}
