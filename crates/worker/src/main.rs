use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hh_core::analysis::{self, report::format_rub};
use hh_core::ingest::{HhVacancyFetcher, SearchQuery, VacancySource};
use hh_core::predict::{ApartmentFeatures, PricePredictor};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "hh_worker", args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    analyze: AnalyzeArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch vacancies, print salary statistics, save the chart and CSV export (default).
    Analyze(AnalyzeArgs),

    /// Predict an apartment price with the model the API serves.
    Predict(PredictArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Search text.
    #[arg(long, default_value = "data scientist")]
    text: String,

    /// Region code (1 = Moscow, 2 = St Petersburg).
    #[arg(long, default_value_t = 1)]
    area: u32,

    /// Listings per page. Only the first page is fetched.
    #[arg(long, default_value_t = 100)]
    per_page: u32,

    #[arg(long, default_value = "salary_analysis.png")]
    chart_out: PathBuf,

    #[arg(long, default_value = "hh_vacancies.csv")]
    csv_out: PathBuf,
}

#[derive(Debug, Args)]
struct PredictArgs {
    /// Total area, m².
    #[arg(long)]
    area: f64,

    #[arg(long)]
    rooms: f64,

    #[arg(long)]
    minutes_to_metro: f64,

    #[arg(long)]
    floor: f64,

    #[arg(long)]
    total_floors: f64,

    #[arg(long)]
    metro_station: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = hh_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Analyze(cli.analyze)) {
        Command::Analyze(args) => run_analyze(&settings, args).await,
        Command::Predict(args) => run_predict(&settings, args),
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker run failed");
    }
    result
}

async fn run_analyze(settings: &hh_core::config::Settings, args: AnalyzeArgs) -> anyhow::Result<()> {
    println!(
        "Analysis date: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );

    let fetcher = HhVacancyFetcher::from_settings(settings)?;
    let query = SearchQuery {
        text: args.text,
        area: args.area,
        per_page: args.per_page,
    };

    let vacancies = fetcher.fetch(&query).await;

    let Some(analysis) = analysis::analyze(&vacancies, Some(args.chart_out.as_path())) else {
        println!("No data to analyze: could not fetch vacancies from the listing API");
        return Ok(());
    };

    println!("{}", analysis.report);
    if let Some(path) = &analysis.report.chart_path {
        println!("Charts saved to {}", path.display());
    }

    analysis
        .write_csv(&args.csv_out)
        .with_context(|| format!("failed to export {}", args.csv_out.display()))?;

    println!("Data saved to {}", args.csv_out.display());
    println!("Total vacancies processed: {}", analysis.records.len());

    tracing::info!(
        source = fetcher.source_name(),
        records = analysis.records.len(),
        csv = %args.csv_out.display(),
        "analysis run finished"
    );
    Ok(())
}

fn run_predict(settings: &hh_core::config::Settings, args: PredictArgs) -> anyhow::Result<()> {
    let predictor = PricePredictor::from_settings(settings)?;

    let input = ApartmentFeatures {
        area: args.area,
        rooms: args.rooms,
        minutes_to_metro: args.minutes_to_metro,
        floor: args.floor,
        total_floors: args.total_floors,
        metro_station: args.metro_station,
    };

    let price = predictor.predict(&input).context("prediction failed")?;
    println!("Predicted price: {} RUB", format_rub(price as f64));
    Ok(())
}

fn init_sentry(settings: &hh_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
