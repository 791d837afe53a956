//! Ingestion: fetch, split, persist.

use crate::artifact::IngestionArtifact;
use crate::error::PipelineError;
use modelgate_frame::{train_test_split, Frame};
use modelgate_schema::PipelineConfig;
use modelgate_store::DocumentStore;
use std::path::Path;

/// Fetch the source collection, split it, and persist both partitions.
///
/// # Errors
/// - [`PipelineError::Store`] when the fetch fails after retries
/// - [`PipelineError::Ingestion`] when the table is empty or the split is
///   invalid
/// - [`PipelineError::Frame`] when documents do not match the schema
pub async fn run(
    config: &PipelineConfig,
    documents: &dyn DocumentStore,
    run_dir: &Path,
) -> Result<IngestionArtifact, PipelineError> {
    let records = documents.fetch(&config.collection).await?;
    if records.is_empty() {
        return Err(PipelineError::Ingestion(format!(
            "collection `{}` returned no documents",
            config.collection
        )));
    }

    let frame = Frame::from_documents(&records, &config.schema)
        .map_err(|e| PipelineError::frame("ingestion", e))?;
    let total_rows = frame.n_rows();

    let (train, test) = train_test_split(&frame, config.test_ratio, config.split_seed)
        .map_err(|e| PipelineError::Ingestion(e.to_string()))?;

    let train_path = run_dir.join("train.csv");
    let test_path = run_dir.join("test.csv");
    train
        .write_csv(&train_path)
        .map_err(|e| PipelineError::frame("ingestion", e))?;
    test.write_csv(&test_path)
        .map_err(|e| PipelineError::frame("ingestion", e))?;

    tracing::info!(
        total_rows,
        train_rows = train.n_rows(),
        test_rows = test.n_rows(),
        "ingestion complete"
    );

    Ok(IngestionArtifact {
        train,
        test,
        train_path,
        test_path,
        total_rows,
    })
}
