//! Pipeline error taxonomy.
//!
//! Each stage wraps underlying failures with its own variant so a failed run
//! names the stage that aborted it. The driver never recovers; any variant
//! terminates the run.

use modelgate_frame::FrameError;
use modelgate_store::StoreError;
use std::path::PathBuf;

/// Errors aborting a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Ingestion stage failed (empty table, bad split)
    #[error("ingestion failed: {0}")]
    Ingestion(String),

    /// Validation stage found schema or drift violations
    #[error("validation failed:\n{0}")]
    Validation(String),

    /// Transformation stage failed
    #[error("transformation failed: {0}")]
    Transformation(String),

    /// Model fitting failed
    #[error("training failed: {0}")]
    Training(String),

    /// Evaluation stage failed
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Model push failed
    #[error("model push failed: {0}")]
    Push(String),

    /// Remote store failure, with the adapter's classification intact
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Frame-level failure with the stage it occurred in
    #[error("{stage}: {source}")]
    Frame {
        /// Stage name
        stage: &'static str,
        /// Underlying frame error
        #[source]
        source: FrameError,
    },

    /// Filesystem failure while persisting an artifact
    #[error("artifact io at {path}: {source}")]
    Io {
        /// Path being written or read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Artifact or bundle (de)serialization failure
    #[error("artifact serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PipelineError {
    /// Attach a stage name to a frame error.
    pub(crate) fn frame(stage: &'static str, source: FrameError) -> Self {
        Self::Frame { stage, source }
    }

    /// Attach a path to an I/O error.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
