//! Three-panel PNG: salary histogram, experience bars, currency pie.

use crate::analysis::report::format_rub;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

const WIDTH: u32 = 1500;
const HEIGHT: u32 = 500;
const HIST_BINS: usize = 20;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const PIE_PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Debug, Clone, Default)]
pub struct ChartData {
    /// Clipped salary averages, RUB.
    pub salaries: Vec<f64>,
    /// Experience frequencies over all records.
    pub experience: Vec<(String, usize)>,
    /// Currency frequencies over salary-bearing records.
    pub currencies: Vec<(String, usize)>,
}

/// Renders `data` to `path`, overwriting any existing file.
pub fn render(data: &ChartData, path: &Path) -> anyhow::Result<()> {
    draw(data, path)
        .map_err(|e| anyhow::anyhow!("failed to render chart to {}: {e}", path.display()))
}

fn draw(data: &ChartData, path: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 3));
    draw_salary_histogram(&panels[0], &data.salaries)?;
    draw_experience_bars(&panels[1], &data.experience)?;
    draw_currency_pie(&panels[2], &data.currencies)?;

    root.present()?;
    Ok(())
}

fn draw_salary_histogram(area: &Panel<'_>, salaries: &[f64]) -> Result<(), Box<dyn Error>> {
    let Some((lo, hi, counts)) = histogram_bins(salaries, HIST_BINS) else {
        return Ok(());
    };
    let width = (hi - lo) / HIST_BINS as f64;
    let top = counts.iter().copied().max().unwrap_or(0) + 1;

    let mut chart = ChartBuilder::on(area)
        .caption("Salary distribution (RUB)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(lo..hi, 0u32..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .x_label_formatter(&|v: &f64| format_rub(*v))
        .x_desc("Salary, RUB")
        .y_desc("Vacancies")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        let x0 = lo + width * i as f64;
        Rectangle::new([(x0, 0), (x0 + width, count)], SKY_BLUE.mix(0.7).filled())
    }))?;

    Ok(())
}

fn draw_experience_bars(
    area: &Panel<'_>,
    experience: &[(String, usize)],
) -> Result<(), Box<dyn Error>> {
    if experience.is_empty() {
        return Ok(());
    }
    let n = experience.len() as u32;
    let top = experience.iter().map(|(_, c)| *c as u32).max().unwrap_or(0) + 1;

    let mut chart = ChartBuilder::on(area)
        .caption("Required experience", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(40)
        .build_cartesian_2d((0u32..n).into_segmented(), 0u32..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(experience.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => experience
                .get(*i as usize)
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(LIGHT_GREEN.mix(0.7).filled())
            .margin(10)
            .data(
                experience
                    .iter()
                    .enumerate()
                    .map(|(i, (_, count))| (i as u32, *count as u32)),
            ),
    )?;

    Ok(())
}

fn draw_currency_pie(area: &Panel<'_>, currencies: &[(String, usize)]) -> Result<(), Box<dyn Error>> {
    if currencies.is_empty() {
        return Ok(());
    }
    let area = area.titled("Currency share", ("sans-serif", 20))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let sizes: Vec<f64> = currencies.iter().map(|(_, c)| *c as f64).collect();
    let labels: Vec<&str> = currencies.iter().map(|(name, _)| name.as_str()).collect();
    let colors: Vec<RGBColor> = (0..currencies.len())
        .map(|i| PIE_PALETTE[i % PIE_PALETTE.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 16).into_font());
    pie.percentages(("sans-serif", 14).into_font().color(&BLACK));
    area.draw(&pie)?;

    Ok(())
}

/// Splits values into `bins` equal-width buckets over `[min, max]`.
/// A single distinct value gets a one-ruble-wide range.
fn histogram_bins(values: &[f64], bins: usize) -> Option<(f64, f64, Vec<u32>)> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let lo = values.iter().copied().reduce(f64::min)?;
    let hi = values.iter().copied().reduce(f64::max)?;
    let hi = if hi > lo { hi } else { lo + 1.0 };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0u32; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some((lo, hi, counts))
}
