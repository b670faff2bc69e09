use crate::domain::vacancy::VacancyRecord;
use anyhow::Context;
use std::path::Path;

const HEADERS: [&str; 10] = [
    "name",
    "employer",
    "salary_from",
    "salary_to",
    "salary_from_rub",
    "salary_to_rub",
    "currency",
    "experience",
    "schedule",
    "url",
];

/// Writes one UTF-8 CSV row per record. Absent values become empty cells.
pub fn write_vacancies_csv(records: &[VacancyRecord], path: &Path) -> anyhow::Result<()> {
    // Header is written by hand so an empty set still yields a well-formed file.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("cannot create CSV {}", path.display()))?;

    wtr.write_record(HEADERS)
        .context("failed to write CSV header")?;

    for record in records {
        wtr.serialize(record)
            .with_context(|| format!("failed to write CSV row for {:?}", record.name))?;
    }

    wtr.flush().context("failed to flush CSV")?;
    Ok(())
}
