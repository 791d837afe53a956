//! The modelgate staged pipeline.
//!
//! Six stages run strictly in sequence under the [`Pipeline`] driver:
//! ingestion → validation → transformation → training → evaluation → push.
//! Each stage consumes the previous stage's typed artifact and produces its
//! own; any stage error aborts the run. The only cross-run state is the
//! production model bundle in the object-store registry, replaced by the
//! pusher when the quality gate accepts a newly trained model.

mod artifact;
mod bundle;
mod driver;
mod error;
mod model;
pub mod stages;
mod transform;

pub use artifact::{
    Decision, EvaluationArtifact, IngestionArtifact, PushArtifact, RunId, RunReport,
    TrainerArtifact, TransformationArtifact, ValidationArtifact, ValidationReport, Violation,
};
pub use bundle::{ModelBundle, TrainingMetrics};
pub use driver::Pipeline;
pub use error::PipelineError;
pub use model::{FittedModel, LogisticRegression};
pub use transform::FittedTransformer;
