mod common;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use reelforge_core::{source, BatchOrchestrator, ProgressStore, RunOptions, RunReport};

use common::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "reelforge", version)]
#[command(about = "Generate, publish and record a video for every record in a CSV source")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "REELFORGE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// CSV source with `name` and `prompt` columns (overrides `[source] path`)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Look up records and write placeholder ledger entries; no generation,
    /// upload or write-back
    #[arg(long)]
    dry_run: bool,

    /// Skip records already completed in the progress ledger
    #[arg(long)]
    resume: bool,

    /// Jobs per batch (overrides `[run] batch_size`)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Only process these names (comma-separated, case-insensitive)
    #[arg(long, value_delimiter = ',')]
    careers: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    common::init_logging();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = common::load_and_validate(&cli.config)?;

    let source_path = cli
        .source
        .clone()
        .or_else(|| config.source.path.clone())
        .context("No job source: pass --source or set [source] path")?;
    let jobs = source::load(&source_path)
        .with_context(|| format!("Failed to load jobs from {:?}", source_path))?;

    let filter: Vec<String> = cli
        .careers
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mut options = RunOptions::from_config(&config.run)
        .with_filter(filter)
        .with_resume(cli.resume)
        .with_dry_run(cli.dry_run);
    if let Some(batch_size) = cli.batch_size {
        options = options.with_batch_size(batch_size);
    }

    let services = common::build_services(&config)?;
    let orchestrator =
        BatchOrchestrator::new(services.generation, services.storage, services.repository);

    let mut progress = ProgressStore::load(config.progress.path.clone());
    info!("Progress ledger: {:?}", progress.path());

    let outcome = tokio::select! {
        result = orchestrator.run(jobs, &options, &mut progress) => Some(result),
        _ = signal::ctrl_c() => None,
    };

    let report = match &outcome {
        Some(Ok(report)) => Some(report),
        _ => None,
    };
    print_summary(&progress, report);

    match outcome {
        Some(Ok(_)) => Ok(()),
        Some(Err(e)) => Err(e).context("Run aborted"),
        None => {
            warn!("Interrupted; progress is saved in {:?}", progress.path());
            Err(anyhow!("Interrupted"))
        }
    }
}

fn print_summary(progress: &ProgressStore, report: Option<&RunReport>) {
    println!();
    println!("Summary ({})", progress.path().display());
    println!("{}", progress.summary());
    let state = progress.state();
    println!(
        "Total and remaining count the {} jobs of the run that started this ledger ({}).",
        state.total_jobs,
        state.started_at.format("%Y-%m-%d %H:%M UTC")
    );

    let Some(report) = report else {
        return;
    };
    if report.skipped_completed > 0 {
        println!("Skipped (already completed): {}", report.skipped_completed);
    }
    if !report.failures.is_empty() {
        println!("Failed this run:");
        for failure in &report.failures {
            println!("  - {}: {}", failure.name, failure.error);
        }
    }
}
