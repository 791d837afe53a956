//! Evaluation: the quality gate against the production model.

use crate::artifact::{Decision, EvaluationArtifact, IngestionArtifact, TrainerArtifact};
use crate::bundle::ModelBundle;
use crate::error::PipelineError;
use crate::transform::FittedTransformer;
use modelgate_schema::PipelineConfig;
use modelgate_store::ObjectStore;

/// Compare the new model against the current production model.
///
/// With no production bundle in the registry the new model is accepted
/// unconditionally. Otherwise the production bundle is scored on the same
/// raw test partition **through its own paired transformer**, and the gate
/// accepts iff `new_score - current_score >= promotion_threshold`.
///
/// A production bundle fitted under a different schema fingerprint cannot be
/// scored on this run's data; it is treated as absent and the new model is
/// accepted.
///
/// # Errors
/// - [`PipelineError::Store`] when the registry cannot be reached
/// - [`PipelineError::Evaluation`] when the production bundle is malformed
///   or cannot be scored
pub async fn run(
    config: &PipelineConfig,
    registry: &dyn ObjectStore,
    ingestion: &IngestionArtifact,
    trainer: &TrainerArtifact,
) -> Result<EvaluationArtifact, PipelineError> {
    let new_score = trainer.bundle.metrics.test_accuracy;

    let current_score = match production_bundle(config, registry).await? {
        None => None,
        Some(bundle) if !bundle.matches_schema(&config.schema.fingerprint()) => {
            tracing::warn!(
                production_fingerprint = %bundle.schema_fingerprint,
                "production bundle was fitted under a different schema; treating as absent"
            );
            None
        }
        Some(bundle) => Some(score_production(config, &bundle, ingestion)?),
    };

    let decision = Decision::gate(new_score, current_score, config.promotion_threshold);
    tracing::info!(
        accepted = decision.accepted,
        new_score,
        current_score = ?decision.current_score,
        threshold = decision.threshold,
        "evaluation complete"
    );

    Ok(EvaluationArtifact { decision })
}

/// Download and decode the production bundle, if one exists.
async fn production_bundle(
    config: &PipelineConfig,
    registry: &dyn ObjectStore,
) -> Result<Option<ModelBundle>, PipelineError> {
    if !registry.exists(&config.model_key).await? {
        return Ok(None);
    }
    let bytes = registry.download(&config.model_key).await?;
    let bundle = ModelBundle::from_bytes(&bytes)
        .map_err(|e| PipelineError::Evaluation(format!("malformed production bundle: {e}")))?;
    Ok(Some(bundle))
}

/// Score a production bundle on this run's raw test partition.
fn score_production(
    config: &PipelineConfig,
    bundle: &ModelBundle,
    ingestion: &IngestionArtifact,
) -> Result<f64, PipelineError> {
    let x = bundle
        .transformer
        .apply(&ingestion.test)
        .map_err(|e| PipelineError::Evaluation(e.to_string()))?;
    let y = FittedTransformer::target_vector(
        &ingestion.test,
        &config.schema,
        bundle.model.positive_class(),
    )
    .map_err(|e| PipelineError::Evaluation(e.to_string()))?;
    bundle
        .model
        .accuracy(&x, &y)
        .map_err(|e| PipelineError::Evaluation(e.to_string()))
}
