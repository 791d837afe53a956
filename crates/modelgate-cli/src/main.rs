//! Pipeline entry point: load config, wire the stores, run one pipeline pass.

use anyhow::Context;
use clap::Parser;
use modelgate_pipeline::Pipeline;
use modelgate_schema::PipelineConfig;
use modelgate_store::{MongoDocumentStore, RetryPolicy, S3ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Run the training pipeline once against the configured stores.
#[derive(Debug, Parser)]
#[command(name = "modelgate", version, about)]
struct Cli {
    /// Path to the pipeline configuration file
    #[arg(long, default_value = "config/modelgate.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let retry = RetryPolicy::new(config.retry.max_attempts, config.retry.base_delay_ms);

    let uri = PipelineConfig::mongo_uri()?;
    let documents = MongoDocumentStore::connect(&uri, &config.database, retry)
        .await
        .context("connecting to the document store")?;
    let registry = S3ObjectStore::from_env(&config.bucket, retry).await;

    let pipeline = Pipeline::new(
        Arc::new(config),
        Arc::new(documents),
        Arc::new(registry),
    );
    let report = pipeline.run().await?;

    println!("run {} finished", report.run_id);
    println!(
        "  new score:     {:.4}",
        report.decision.new_score
    );
    match report.decision.current_score {
        Some(current) => println!("  current score: {current:.4}"),
        None => println!("  current score: none (no production model)"),
    }
    println!(
        "  decision:      {}",
        if report.decision.accepted { "accept" } else { "reject" }
    );
    println!("  pushed:        {}", report.pushed);
    Ok(())
}
