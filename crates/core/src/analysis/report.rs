use crate::analysis::stats::Summary;
use crate::domain::vacancy::VacancyRecord;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceStats {
    pub experience: String,
    pub mean: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl From<Summary> for SalaryStats {
    fn from(s: Summary) -> Self {
        Self {
            count: s.count,
            mean: s.mean,
            median: s.median,
            min: s.min,
            max: s.max,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub total: usize,
    pub preview: Vec<VacancyRecord>,
    pub top_employers: Vec<(String, usize)>,
    /// Over salary-bearing records, before outlier clipping.
    pub currencies: Vec<(String, usize)>,
    /// Over clipped records; `None` when nothing survives clipping.
    pub salary: Option<SalaryStats>,
    pub by_experience: Vec<ExperienceStats>,
    pub chart_path: Option<PathBuf>,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== ANALYSIS OF {} VACANCIES ===", self.total)?;

        writeln!(f, "\n1. First {} vacancies:", self.preview.len())?;
        for r in &self.preview {
            writeln!(
                f,
                "   {} | {} | {} | {} | {}",
                r.name,
                r.employer.as_deref().unwrap_or("-"),
                opt_amount(r.salary_from),
                opt_amount(r.salary_to),
                r.currency.as_deref().unwrap_or("-"),
            )?;
        }

        writeln!(f, "\n2. Employers with the most vacancies:")?;
        for (employer, count) in &self.top_employers {
            writeln!(f, "   {employer}: {count}")?;
        }

        if self.currencies.is_empty() {
            return Ok(());
        }

        writeln!(f, "\n3. Currency distribution:")?;
        for (currency, count) in &self.currencies {
            writeln!(f, "   {currency}: {count}")?;
        }

        let Some(salary) = &self.salary else {
            return Ok(());
        };

        writeln!(f, "\n4. Salaries in RUB ({} vacancies):", salary.count)?;
        writeln!(f, "   Mean salary: {} RUB", format_rub(salary.mean))?;
        writeln!(f, "   Median salary: {} RUB", format_rub(salary.median))?;
        writeln!(
            f,
            "   Range: {} - {} RUB",
            format_rub(salary.min),
            format_rub(salary.max)
        )?;

        writeln!(f, "\n5. Salaries by experience:")?;
        for e in &self.by_experience {
            writeln!(
                f,
                "   {}: mean {}, count {}, min {}, max {}",
                e.experience,
                format_rub(e.mean),
                e.count,
                format_rub(e.min),
                format_rub(e.max)
            )?;
        }

        Ok(())
    }
}

fn opt_amount(v: Option<f64>) -> String {
    v.map(format_rub).unwrap_or_else(|| "-".to_string())
}

/// Whole rubles with `,` thousands separators, e.g. `1,234,568`.
pub fn format_rub(v: f64) -> String {
    let digits = format!("{:.0}", v.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0.0 && digits != "0" {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
