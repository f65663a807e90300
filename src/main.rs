use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use wikisense::{AnalysisOptions, AnalysisReport, Config, ConfigLoader, Pipeline};

#[derive(Parser)]
#[command(name = "wikisense")]
#[command(
    version,
    about = "Sensitivity scoring for Wikipedia articles from public MediaWiki signals"
)]
struct Cli {
    /// Pages to analyze: bare titles or full article URLs (any edition)
    #[arg(required = true)]
    pages: Vec<String>,

    /// Window start (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Window end (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Default language for inputs that carry none (auto-detected from
    /// URLs otherwise)
    #[arg(long)]
    lang: Option<String>,

    /// Pages per work-item batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Base worker-pool size
    #[arg(long)]
    workers: Option<usize>,

    /// Domain blacklist file (one domain per line, or CSV with a `domain`
    /// column)
    #[arg(long)]
    blacklist: Option<PathBuf>,

    /// Sockpuppet watchlist file (one username per line)
    #[arg(long)]
    sockpuppets: Option<PathBuf>,

    /// Configuration file (otherwise the usual resolution chain applies)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Print the full JSON report instead of the score table
    #[arg(long)]
    json: bool,

    #[arg(long, short)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "wikisense=debug" } else { "wikisense=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge CLI flags over the resolved configuration
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if cli.lang.is_some() {
        config.analysis.default_language = cli.lang.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.analysis.batch_size = batch_size;
    }
    if let Some(workers) = cli.workers {
        config.analysis.max_workers = workers;
    }
    if cli.blacklist.is_some() {
        config.lists.blacklist = cli.blacklist.clone();
    }
    if cli.sockpuppets.is_some() {
        config.lists.sockpuppets = cli.sockpuppets.clone();
    }
}

/// Minimal table: one line per page, sensitivity colored by severity
fn print_score_table(report: &AnalysisReport) {
    let title_width = report
        .pages
        .iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 60);

    println!(
        "{:<title_width$}  {:<8}  {:>12}",
        "Page", "Language", "Sensitivity"
    );
    println!("{}", "-".repeat(title_width + 24));
    for page in &report.pages {
        let value = page.scores.sensitivity;
        let rendered = format!("{value:>11.2}%");
        let colored = if value < 30.0 {
            style(rendered).green()
        } else if value < 60.0 {
            style(rendered).yellow()
        } else {
            style(rendered).red()
        };
        let title: String = page.title.chars().take(title_width).collect();
        println!(
            "{:<title_width$}  {:<8}  {}",
            title,
            page.language.to_uppercase(),
            colored
        );
    }
    if let Some(error) = &report.error {
        eprintln!("{} {error}", style("analysis failed:").red().bold());
    }
}

async fn run(cli: Cli) -> anyhow::Result<AnalysisReport> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConfigLoader::load().context("loading configuration")?,
    };
    apply_cli_overrides(&mut config, &cli);

    let pipeline = Pipeline::new(&config).context("building pipeline")?;
    let options = AnalysisOptions::resolve(&config, &cli.pages, cli.start, cli.end);
    Ok(pipeline.analyze(&cli.pages, &options).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;

    match run(cli).await {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(err) => {
                        eprintln!("error: failed to serialize report: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_score_table(&report);
            }
            if report.error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
