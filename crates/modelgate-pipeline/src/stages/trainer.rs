//! Training: fit the classifier and package it with its transformer.

use crate::artifact::{TrainerArtifact, TransformationArtifact};
use crate::bundle::{ModelBundle, TrainingMetrics};
use crate::error::PipelineError;
use crate::model::LogisticRegression;
use std::path::Path;

/// Fit the configured model on the transformed train matrix, score both
/// partitions, and bundle the model with the transformer that encoded them.
///
/// # Errors
/// - [`PipelineError::Training`] on fit or scoring failure
/// - [`PipelineError::Io`] when persisting the bundle fails
pub fn run(
    transformation: &TransformationArtifact,
    run_dir: &Path,
) -> Result<TrainerArtifact, PipelineError> {
    let trainer = LogisticRegression::default();
    let model = trainer.fit(
        &transformation.x_train,
        &transformation.y_train,
        transformation.classes.clone(),
    )?;

    let train_accuracy = model.accuracy(&transformation.x_train, &transformation.y_train)?;
    let test_accuracy = model.accuracy(&transformation.x_test, &transformation.y_test)?;

    let bundle = ModelBundle::new(
        model,
        transformation.transformer.clone(),
        TrainingMetrics {
            train_accuracy,
            test_accuracy,
        },
    );

    let bundle_path = run_dir.join("model_bundle.json");
    std::fs::write(&bundle_path, bundle.to_bytes()?)
        .map_err(|e| PipelineError::io(&bundle_path, e))?;

    tracing::info!(train_accuracy, test_accuracy, "training complete");

    Ok(TrainerArtifact {
        bundle,
        bundle_path,
    })
}
