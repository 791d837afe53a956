//! Typed per-stage artifacts.
//!
//! Every stage returns exactly one immutable artifact struct; the driver
//! threads it into the next stage. Artifacts carry both the in-memory data
//! the next stage needs and the paths of the files persisted under the run
//! directory, so a finished run leaves an inspectable trail on disk.

use crate::bundle::ModelBundle;
use crate::transform::FittedTransformer;
use chrono::{DateTime, Utc};
use modelgate_frame::Frame;
use modelgate_schema::ColumnKind;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Fresh random run id.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output of the ingestion stage: the split partitions and their files.
#[derive(Debug, Clone)]
pub struct IngestionArtifact {
    /// Train partition
    pub train: Frame,
    /// Test partition
    pub test: Frame,
    /// CSV file of the train partition
    pub train_path: PathBuf,
    /// CSV file of the test partition
    pub test_path: PathBuf,
    /// Row count before splitting
    pub total_rows: usize,
}

/// One violation found by the validation stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    /// A schema column is absent from a partition
    MissingColumn {
        /// Partition name ("train"/"test")
        partition: &'static str,
        /// Missing column
        column: String,
    },
    /// A partition carries a column the schema does not declare
    UnexpectedColumn {
        /// Partition name
        partition: &'static str,
        /// Extra column
        column: String,
    },
    /// Column kind differs from the schema declaration
    KindMismatch {
        /// Partition name
        partition: &'static str,
        /// Column name
        column: String,
        /// Declared kind
        expected: ColumnKind,
        /// Observed kind
        found: ColumnKind,
    },
    /// Numeric drift between train and test exceeds the threshold
    Drift {
        /// Column name
        column: String,
        /// Standardized mean difference observed
        smd: f64,
        /// Configured limit
        threshold: f64,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { partition, column } => {
                write!(f, "{partition}: missing column `{column}`")
            }
            Self::UnexpectedColumn { partition, column } => {
                write!(f, "{partition}: unexpected column `{column}`")
            }
            Self::KindMismatch {
                partition,
                column,
                expected,
                found,
            } => write!(
                f,
                "{partition}: column `{column}` declared {expected}, found {found}"
            ),
            Self::Drift {
                column,
                smd,
                threshold,
            } => write!(
                f,
                "drift: column `{column}` standardized mean difference {smd:.4} exceeds {threshold}"
            ),
        }
    }
}

/// Every violation found in one validation pass.
///
/// Validation never stops at the first problem; the report lists all of
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Violations in detection order
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Whether no violations were found.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable report, one violation per line.
    #[must_use]
    pub fn render(&self) -> String {
        if self.violations.is_empty() {
            return "all checks passed".to_string();
        }
        let mut out = String::new();
        for violation in &self.violations {
            out.push_str("- ");
            out.push_str(&violation.to_string());
            out.push('\n');
        }
        out
    }
}

/// Output of the validation stage.
#[derive(Debug, Clone)]
pub struct ValidationArtifact {
    /// Whether the partitions conform to the schema
    pub is_valid: bool,
    /// The full violation report
    pub report: ValidationReport,
    /// Text report file under the run directory
    pub report_path: PathBuf,
}

/// Output of the transformation stage: encoded matrices and the fitted
/// transformer that produced them.
#[derive(Debug, Clone)]
pub struct TransformationArtifact {
    /// Transformer fitted on the train partition only
    pub transformer: FittedTransformer,
    /// Encoded train features
    pub x_train: Array2<f64>,
    /// Train labels (0/1)
    pub y_train: Array1<f64>,
    /// Encoded test features
    pub x_test: Array2<f64>,
    /// Test labels (0/1)
    pub y_test: Array1<f64>,
    /// Target class renderings, sorted; index 1 is the positive class
    pub classes: [String; 2],
    /// Serialized transformer file
    pub transformer_path: PathBuf,
    /// Encoded train matrix file
    pub train_matrix_path: PathBuf,
    /// Encoded test matrix file
    pub test_matrix_path: PathBuf,
}

/// Output of the trainer stage.
#[derive(Debug, Clone)]
pub struct TrainerArtifact {
    /// The new model with its paired transformer
    pub bundle: ModelBundle,
    /// Serialized bundle file under the run directory
    pub bundle_path: PathBuf,
}

/// The quality-gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the new model is promoted
    pub accepted: bool,
    /// Test score of the newly trained model
    pub new_score: f64,
    /// Test score of the production model, if one existed
    pub current_score: Option<f64>,
    /// Improvement threshold applied
    pub threshold: f64,
}

impl Decision {
    /// Apply the gate: accept iff `new - current >= threshold`.
    ///
    /// With no production score the new model is accepted unconditionally.
    /// Boundary equality accepts.
    #[must_use]
    pub fn gate(new_score: f64, current_score: Option<f64>, threshold: f64) -> Self {
        let accepted = match current_score {
            None => true,
            Some(current) => new_score - current >= threshold,
        };
        Self {
            accepted,
            new_score,
            current_score,
            threshold,
        }
    }
}

/// Output of the evaluation stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationArtifact {
    /// The accept/reject decision with both scores
    pub decision: Decision,
}

/// Output of the pusher stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushArtifact {
    /// Whether a bundle was uploaded
    pub pushed: bool,
    /// Registry key written, when pushed
    pub key: Option<String>,
}

/// Summary of one completed run, persisted as `report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: RunId,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time
    pub finished_at: DateTime<Utc>,
    /// Rows fetched before splitting
    pub total_rows: usize,
    /// Train partition rows
    pub train_rows: usize,
    /// Test partition rows
    pub test_rows: usize,
    /// Violations found by validation (empty on a clean run)
    pub validation: ValidationReport,
    /// Train accuracy of the new model
    pub train_accuracy: f64,
    /// Test accuracy of the new model
    pub test_accuracy: f64,
    /// The quality-gate decision
    pub decision: Decision,
    /// Whether the bundle was pushed
    pub pushed: bool,
}
