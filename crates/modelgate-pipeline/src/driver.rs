//! The pipeline driver: six stages, strictly in sequence.

use crate::artifact::{RunId, RunReport};
use crate::error::PipelineError;
use crate::stages;
use chrono::Utc;
use modelgate_schema::PipelineConfig;
use modelgate_store::{DocumentStore, ObjectStore};
use std::sync::Arc;

/// Owns the configuration and the two store seams, and runs the staged
/// pipeline end-to-end.
///
/// Execution is single-threaded and strictly sequential; each stage's
/// artifact is the next stage's input. The first stage error aborts the
/// whole run — there is no partial-success state and no resumption.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    documents: Arc<dyn DocumentStore>,
    registry: Arc<dyn ObjectStore>,
}

impl Pipeline {
    /// Assemble a pipeline from its configuration and store adapters.
    #[must_use]
    pub fn new(
        config: Arc<PipelineConfig>,
        documents: Arc<dyn DocumentStore>,
        registry: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            documents,
            registry,
        }
    }

    /// Run every stage once and persist the run report.
    ///
    /// # Errors
    /// The first failing stage's [`PipelineError`], after logging it with
    /// its run id.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = RunId::new();
        match self.run_stages(run_id).await {
            Ok(report) => {
                tracing::info!(
                    %run_id,
                    accepted = report.decision.accepted,
                    pushed = report.pushed,
                    "pipeline run complete"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::error!(%run_id, error = %err, "pipeline run aborted");
                Err(err)
            }
        }
    }

    async fn run_stages(&self, run_id: RunId) -> Result<RunReport, PipelineError> {
        let started_at = Utc::now();
        let run_dir = self.config.artifact_dir.join(format!("run-{run_id}"));
        std::fs::create_dir_all(&run_dir).map_err(|e| PipelineError::io(&run_dir, e))?;
        tracing::info!(%run_id, run_dir = %run_dir.display(), "pipeline run started");

        let ingestion =
            stages::ingestion::run(&self.config, self.documents.as_ref(), &run_dir).await?;

        let validation = stages::validation::run(&self.config, &ingestion, &run_dir)?;
        if !validation.is_valid {
            // The stage reports; the driver halts.
            return Err(PipelineError::Validation(validation.report.render()));
        }

        let transformation =
            stages::transformation::run(&self.config, &ingestion, &validation, &run_dir)?;

        let trainer = stages::trainer::run(&transformation, &run_dir)?;

        let evaluation =
            stages::evaluation::run(&self.config, self.registry.as_ref(), &ingestion, &trainer)
                .await?;

        let push =
            stages::pusher::run(&self.config, self.registry.as_ref(), &trainer, &evaluation)
                .await?;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            total_rows: ingestion.total_rows,
            train_rows: ingestion.train.n_rows(),
            test_rows: ingestion.test.n_rows(),
            validation: validation.report,
            train_accuracy: trainer.bundle.metrics.train_accuracy,
            test_accuracy: trainer.bundle.metrics.test_accuracy,
            decision: evaluation.decision,
            pushed: push.pushed,
        };

        let report_path = run_dir.join("report.json");
        let payload = serde_json::to_vec_pretty(&report)?;
        std::fs::write(&report_path, payload).map_err(|e| PipelineError::io(&report_path, e))?;

        Ok(report)
    }
}
