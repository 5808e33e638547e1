mod common;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use reelforge_core::{ProgressStore, RecoveryRequest, RecoveryTool};

use common::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "reelforge-recover", version)]
#[command(about = "Publish a finished generation job that never reached the progress ledger")]
struct Cli {
    /// Job id issued by the generation service
    job_id: String,

    /// Record name, as it appears in the source
    name: String,

    /// Configuration file
    #[arg(long, env = "REELFORGE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    common::init_logging();

    if let Err(e) = run(cli).await {
        error!("Recovery failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = common::load_and_validate(&cli.config)?;
    let services = common::build_services(&config)?;
    let tool = RecoveryTool::new(services.generation, services.storage, services.repository);

    let mut progress = ProgressStore::load(config.progress.path.clone());
    let request = RecoveryRequest {
        job_id: cli.job_id,
        name: cli.name,
    };
    info!("Recovering {} from job {}", request.name, request.job_id);

    let outcome = tool
        .recover(&request, &mut progress)
        .await
        .with_context(|| format!("Could not recover job {}", request.job_id))?;

    println!("Record: {}", outcome.record_id);
    println!("URL:    {}", outcome.artifact_url);
    println!("{}", progress.summary());
    Ok(())
}
