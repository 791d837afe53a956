//! Push: replace the production pointer when the gate accepts.

use crate::artifact::{EvaluationArtifact, PushArtifact, TrainerArtifact};
use crate::error::PipelineError;
use modelgate_schema::PipelineConfig;
use modelgate_store::ObjectStore;

/// Upload the accepted bundle to the production key; do nothing on reject.
///
/// The overwrite is not atomic: two runs pushing concurrently race on the
/// production pointer and the last writer wins. Left unresolved by design.
///
/// # Errors
/// Returns [`PipelineError::Push`] when the upload fails after retries.
pub async fn run(
    config: &PipelineConfig,
    registry: &dyn ObjectStore,
    trainer: &TrainerArtifact,
    evaluation: &EvaluationArtifact,
) -> Result<PushArtifact, PipelineError> {
    if !evaluation.decision.accepted {
        tracing::info!("quality gate rejected the new model; production pointer unchanged");
        return Ok(PushArtifact {
            pushed: false,
            key: None,
        });
    }

    let bytes = trainer.bundle.to_bytes()?;
    registry
        .upload(&config.model_key, bytes)
        .await
        .map_err(|e| PipelineError::Push(format!("upload to `{}`: {e}", config.model_key)))?;
    tracing::info!(key = %config.model_key, "pushed new production bundle");

    Ok(PushArtifact {
        pushed: true,
        key: Some(config.model_key.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Decision;
    use crate::bundle::{ModelBundle, TrainingMetrics};
    use crate::model::LogisticRegression;
    use crate::transform::FittedTransformer;
    use modelgate_frame::Frame;
    use modelgate_schema::PipelineConfig;
    use modelgate_store::{MemoryObjectStore, StoreError};
    use ndarray::array;

    mockall::mock! {
        Registry {}

        #[async_trait::async_trait]
        impl ObjectStore for Registry {
            async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
            async fn download(&self, key: &str) -> Result<Vec<u8>, StoreError>;
            async fn exists(&self, key: &str) -> Result<bool, StoreError>;
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::from_yaml(
            r#"
database: db
collection: rows
bucket: registry
schema:
  columns:
    x: float
    label: bool
  target: label
"#,
        )
        .unwrap()
    }

    fn trainer_artifact(config: &PipelineConfig) -> TrainerArtifact {
        let docs: Vec<_> = (0..10)
            .map(|i| {
                serde_json::json!({ "x": f64::from(i), "label": i >= 5 })
                    .as_object()
                    .unwrap()
                    .clone()
            })
            .collect();
        let frame = Frame::from_documents(&docs, &config.schema).unwrap();
        let transformer = FittedTransformer::fit(&frame, &config.schema).unwrap();
        let x = transformer.apply(&frame).unwrap();
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let model = LogisticRegression::default()
            .fit(&x, &y, ["false".to_string(), "true".to_string()])
            .unwrap();
        TrainerArtifact {
            bundle: ModelBundle::new(
                model,
                transformer,
                TrainingMetrics {
                    train_accuracy: 1.0,
                    test_accuracy: 1.0,
                },
            ),
            bundle_path: "model_bundle.json".into(),
        }
    }

    fn decision(accepted: bool) -> EvaluationArtifact {
        EvaluationArtifact {
            decision: Decision {
                accepted,
                new_score: 0.9,
                current_score: Some(0.8),
                threshold: 0.02,
            },
        }
    }

    #[tokio::test]
    async fn accepted_decision_uploads_the_bundle() {
        let config = config();
        let registry = MemoryObjectStore::new();
        let trainer = trainer_artifact(&config);

        let artifact = run(&config, &registry, &trainer, &decision(true)).await.unwrap();
        assert!(artifact.pushed);
        assert_eq!(artifact.key.as_deref(), Some(config.model_key.as_str()));

        let stored = registry.get(&config.model_key).unwrap();
        let restored = ModelBundle::from_bytes(&stored).unwrap();
        assert_eq!(restored, trainer.bundle);
    }

    #[tokio::test]
    async fn rejected_decision_leaves_registry_untouched() {
        let config = config();
        let registry = MemoryObjectStore::new();
        let trainer = trainer_artifact(&config);

        let artifact = run(&config, &registry, &trainer, &decision(false)).await.unwrap();
        assert!(!artifact.pushed);
        assert!(artifact.key.is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn upload_failure_surfaces_as_a_push_error() {
        let config = config();
        let trainer = trainer_artifact(&config);
        let mut registry = MockRegistry::new();
        registry
            .expect_upload()
            .returning(|_, _| Err(StoreError::Storage("bucket unavailable".into())));

        let err = run(&config, &registry, &trainer, &decision(true))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Push(_)));
        assert!(err.to_string().contains("bucket unavailable"));
    }

    #[tokio::test]
    async fn rejected_decision_never_touches_the_registry() {
        let config = config();
        let trainer = trainer_artifact(&config);
        let mut registry = MockRegistry::new();
        registry.expect_upload().never();

        let artifact = run(&config, &registry, &trainer, &decision(false))
            .await
            .unwrap();
        assert!(!artifact.pushed);
    }

    #[tokio::test]
    async fn rejected_decision_preserves_previous_pointer() {
        let config = config();
        let registry = MemoryObjectStore::new();
        registry
            .upload(&config.model_key, b"previous".to_vec())
            .await
            .unwrap();
        let trainer = trainer_artifact(&config);

        run(&config, &registry, &trainer, &decision(false)).await.unwrap();
        assert_eq!(registry.get(&config.model_key).unwrap(), b"previous".to_vec());
    }
}
