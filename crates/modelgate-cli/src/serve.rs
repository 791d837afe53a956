//! Serving entry point: expose the production model over HTTP.

use anyhow::Context;
use clap::Parser;
use modelgate_schema::PipelineConfig;
use modelgate_serve::AppState;
use modelgate_store::{RetryPolicy, S3ObjectStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Serve predictions from the deployed production bundle.
#[derive(Debug, Parser)]
#[command(name = "modelgate-serve", version, about)]
struct Cli {
    /// Path to the pipeline configuration file
    #[arg(long, default_value = "config/modelgate.yaml")]
    config: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: SocketAddr,
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
    let registry = S3ObjectStore::from_env(&config.bucket, retry).await;

    let state = Arc::new(AppState::new(
        Arc::new(registry),
        config.model_key.clone(),
        config.schema.clone(),
    ));
    let app = modelgate_serve::router(state);

    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("binding {}", cli.addr))?;
    tracing::info!(addr = %cli.addr, "serving predictions");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
