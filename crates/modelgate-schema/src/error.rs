//! Configuration errors.

use std::path::PathBuf;

/// Errors raised while loading or validating the pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config document is not valid YAML or misses required fields
    #[error("malformed config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Config parsed but violates an invariant
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A required environment variable is unset or empty
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}
