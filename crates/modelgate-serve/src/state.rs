//! Shared service state: schema, registry, lazily loaded bundle.

use crate::error::ServeError;
use modelgate_frame::Frame;
use modelgate_pipeline::ModelBundle;
use modelgate_schema::DatasetSchema;
use modelgate_store::{ObjectStore, Record, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One prediction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class label
    pub label: String,
    /// Positive-class probability
    pub probability: f64,
}

/// Shared state behind the service handlers.
pub struct AppState {
    registry: Arc<dyn ObjectStore>,
    model_key: String,
    schema: DatasetSchema,
    bundle: OnceCell<Arc<ModelBundle>>,
}

impl AppState {
    /// Assemble service state; the bundle is not loaded until the first
    /// prediction.
    #[must_use]
    pub fn new(
        registry: Arc<dyn ObjectStore>,
        model_key: impl Into<String>,
        schema: DatasetSchema,
    ) -> Self {
        Self {
            registry,
            model_key: model_key.into(),
            schema,
            bundle: OnceCell::new(),
        }
    }

    /// The production bundle, loading and caching it on first use.
    ///
    /// # Errors
    /// - [`ServeError::NoModel`] when the registry has no bundle
    /// - [`ServeError::SchemaMismatch`] when the deployed bundle was fitted
    ///   under a different schema fingerprint
    pub async fn bundle(&self) -> Result<Arc<ModelBundle>, ServeError> {
        let bundle = self
            .bundle
            .get_or_try_init(|| async {
                let bytes = match self.registry.download(&self.model_key).await {
                    Ok(bytes) => bytes,
                    Err(StoreError::NotFound(_)) => return Err(ServeError::NoModel),
                    Err(e) => return Err(ServeError::Store(e)),
                };
                let bundle = ModelBundle::from_bytes(&bytes)
                    .map_err(|e| ServeError::Internal(e.to_string()))?;
                if !bundle.matches_schema(&self.schema.fingerprint()) {
                    return Err(ServeError::SchemaMismatch);
                }
                tracing::info!(key = %self.model_key, "loaded production bundle");
                Ok(Arc::new(bundle))
            })
            .await?;
        Ok(Arc::clone(bundle))
    }

    /// Score one record against the production model.
    ///
    /// # Errors
    /// - bundle-loading errors from [`AppState::bundle`]
    /// - [`ServeError::BadRequest`] when the record violates the schema
    pub async fn predict(&self, mut record: Record) -> Result<Prediction, ServeError> {
        let bundle = self.bundle().await?;

        // Requests carry features only; the target column is not scored.
        record
            .entry(self.schema.target.clone())
            .or_insert(serde_json::Value::Null);

        let frame = Frame::from_documents(std::slice::from_ref(&record), &self.schema)
            .map_err(|e| ServeError::BadRequest(e.to_string()))?;

        let x = bundle
            .transformer
            .apply(&frame)
            .map_err(|e| ServeError::Internal(e.to_string()))?;
        let proba = bundle
            .model
            .predict_proba(&x)
            .map_err(|e| ServeError::Internal(e.to_string()))?;
        let probability = proba[0];
        let predicted = if probability >= 0.5 { 1.0 } else { 0.0 };

        Ok(Prediction {
            label: bundle.model.class_label(predicted).to_string(),
            probability,
        })
    }
}
