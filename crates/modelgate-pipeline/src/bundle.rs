//! The model bundle: estimator + paired transformer, serialized together.

use crate::error::PipelineError;
use crate::model::FittedModel;
use crate::transform::FittedTransformer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scores recorded when the bundle was trained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Accuracy on the transformed train partition
    pub train_accuracy: f64,
    /// Accuracy on the transformed test partition
    pub test_accuracy: f64,
}

/// A deployable model: the fitted estimator and the fitted transformer it
/// depends on, serialized as one JSON document.
///
/// The two always travel together — the transformer defines the exact input
/// encoding the estimator expects. The recorded schema fingerprint guards
/// against applying the bundle under a different schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Fitted classifier
    pub model: FittedModel,
    /// Transformer the classifier was trained behind
    pub transformer: FittedTransformer,
    /// Fingerprint of the schema the transformer was fitted on
    pub schema_fingerprint: String,
    /// Training-time scores
    pub metrics: TrainingMetrics,
    /// When the bundle was trained
    pub trained_at: DateTime<Utc>,
}

impl ModelBundle {
    /// Assemble a bundle from a model and its paired transformer.
    #[must_use]
    pub fn new(model: FittedModel, transformer: FittedTransformer, metrics: TrainingMetrics) -> Self {
        let schema_fingerprint = transformer.schema_fingerprint().to_string();
        Self {
            model,
            transformer,
            schema_fingerprint,
            metrics,
            trained_at: Utc::now(),
        }
    }

    /// Serialize for registry upload.
    ///
    /// # Errors
    /// Returns [`PipelineError::Serde`] on serialization failure.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize a registry object.
    ///
    /// # Errors
    /// Returns [`PipelineError::Serde`] on malformed bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PipelineError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Whether this bundle was fitted under the given schema fingerprint.
    #[inline]
    #[must_use]
    pub fn matches_schema(&self, fingerprint: &str) -> bool {
        self.schema_fingerprint == fingerprint
    }
}
