//! Pipeline configuration: one immutable struct, loaded once.

use crate::error::ConfigError;
use crate::schema::DatasetSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the document-store connection string.
pub const MONGO_URI_ENV: &str = "MODELGATE_MONGO_URI";

/// Bounded-retry settings for the remote store adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first (>= 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    250
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Immutable process-wide pipeline configuration.
///
/// Constructed once via [`PipelineConfig::load`] and passed by reference into
/// every stage. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Document-store database name
    pub database: String,
    /// Document-store collection to ingest
    pub collection: String,
    /// Object-store bucket holding the model registry
    pub bucket: String,
    /// Key of the production model bundle inside the bucket
    #[serde(default = "default_model_key")]
    pub model_key: String,
    /// Local directory for per-run artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    /// Fraction of rows assigned to the test partition, in (0, 1)
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Seed for the deterministic train/test shuffle
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
    /// Minimum score improvement over production required to promote
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: f64,
    /// Standardized-mean-difference limit for the numeric drift check
    #[serde(default = "default_drift_threshold")]
    pub drift_threshold: f64,
    /// Retry policy for remote calls
    #[serde(default)]
    pub retry: RetryConfig,
    /// Expected table shape
    pub schema: DatasetSchema,
}

fn default_model_key() -> String {
    "production/model.json".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_split_seed() -> u64 {
    42
}

fn default_promotion_threshold() -> f64 {
    0.02
}

fn default_drift_threshold() -> f64 {
    0.25
}

impl PipelineConfig {
    /// Load and validate the configuration from a YAML file.
    ///
    /// # Errors
    /// - [`ConfigError::Io`] if the file cannot be read
    /// - [`ConfigError::Parse`] if the document is malformed
    /// - [`ConfigError::Invalid`] if a value violates an invariant
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    /// Parse and validate a YAML config document.
    ///
    /// # Errors
    /// Same as [`PipelineConfig::load`], minus the I/O variant.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges and the embedded schema.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] on the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "test_ratio must lie in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if !self.promotion_threshold.is_finite() || self.promotion_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "promotion_threshold must be a finite non-negative number, got {}",
                self.promotion_threshold
            )));
        }
        if !self.drift_threshold.is_finite() || self.drift_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "drift_threshold must be a finite positive number, got {}",
                self.drift_threshold
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.collection.is_empty() || self.bucket.is_empty() || self.model_key.is_empty() {
            return Err(ConfigError::Invalid(
                "collection, bucket, and model_key must be non-empty".into(),
            ));
        }
        self.schema.validate()
    }

    /// Document-store connection string from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEnv`] if the variable is unset or empty.
    pub fn mongo_uri() -> Result<String, ConfigError> {
        match std::env::var(MONGO_URI_ENV) {
            Ok(uri) if !uri.is_empty() => Ok(uri),
            _ => Err(ConfigError::MissingEnv(MONGO_URI_ENV)),
        }
    }
}
