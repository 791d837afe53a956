//! Pipeline configuration and dataset schema for modelgate.
//!
//! Everything later stages need to know about the dataset and the run is
//! declared in one YAML document, loaded exactly once at process start into
//! an immutable [`PipelineConfig`]. Stages receive the config by reference;
//! there is no global mutable state.
//!
//! Credentials are deliberately *not* part of the document: the document
//! store URI and object-store keys come from environment variables so that
//! the config file can be committed alongside the code.

mod config;
mod error;
mod schema;

pub use config::{PipelineConfig, RetryConfig};
pub use error::ConfigError;
pub use schema::{ColumnKind, DatasetSchema};
