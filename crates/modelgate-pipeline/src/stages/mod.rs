//! The pipeline stages, in execution order.
//!
//! Each stage is a free function taking the configuration, the previous
//! stage's artifact, and whatever adapter it needs; each returns its own
//! typed artifact or a stage-tagged [`PipelineError`].
//!
//! [`PipelineError`]: crate::error::PipelineError

pub mod evaluation;
pub mod ingestion;
pub mod pusher;
pub mod trainer;
pub mod transformation;
pub mod validation;
