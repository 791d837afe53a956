//! Validation: schema conformance and drift, reported exhaustively.

use crate::artifact::{IngestionArtifact, ValidationArtifact, ValidationReport, Violation};
use crate::error::PipelineError;
use modelgate_frame::Frame;
use modelgate_schema::PipelineConfig;
use std::path::Path;

/// Check both partitions against the schema and each other.
///
/// Collects **every** violation — column-set mismatches in both directions,
/// kind mismatches, and numeric train/test drift — before reporting. The
/// stage itself never fails on violations; it returns `is_valid = false` and
/// leaves halting to the driver.
///
/// # Errors
/// Returns [`PipelineError::Io`] only if the report file cannot be written.
pub fn run(
    config: &PipelineConfig,
    ingestion: &IngestionArtifact,
    run_dir: &Path,
) -> Result<ValidationArtifact, PipelineError> {
    let mut report = ValidationReport::default();

    check_columns(config, &ingestion.train, "train", &mut report);
    check_columns(config, &ingestion.test, "test", &mut report);
    check_drift(config, &ingestion.train, &ingestion.test, &mut report);

    let is_valid = report.is_valid();
    let report_path = run_dir.join("validation.txt");
    std::fs::write(&report_path, report.render())
        .map_err(|e| PipelineError::io(&report_path, e))?;

    if is_valid {
        tracing::info!("validation passed");
    } else {
        tracing::warn!(
            violations = report.violations.len(),
            "validation found violations"
        );
    }

    Ok(ValidationArtifact {
        is_valid,
        report,
        report_path,
    })
}

/// Column-set equality and per-column kind compatibility.
fn check_columns(
    config: &PipelineConfig,
    partition: &Frame,
    name: &'static str,
    report: &mut ValidationReport,
) {
    for (column, kind) in &config.schema.columns {
        match partition.column(column) {
            None => report.violations.push(Violation::MissingColumn {
                partition: name,
                column: column.clone(),
            }),
            Some(found) if found.kind() != *kind => {
                report.violations.push(Violation::KindMismatch {
                    partition: name,
                    column: column.clone(),
                    expected: *kind,
                    found: found.kind(),
                });
            }
            Some(_) => {}
        }
    }
    for column in partition.column_names() {
        if !config.schema.columns.contains_key(column) {
            report.violations.push(Violation::UnexpectedColumn {
                partition: name,
                column: column.to_string(),
            });
        }
    }
}

/// Standardized mean difference between partitions for each numeric column.
fn check_drift(
    config: &PipelineConfig,
    train: &Frame,
    test: &Frame,
    report: &mut ValidationReport,
) {
    for (name, kind) in &config.schema.columns {
        if !kind.is_numeric() {
            continue;
        }
        let (Some(train_col), Some(test_col)) = (train.column(name), test.column(name)) else {
            // Already reported as a missing column.
            continue;
        };
        let Some(smd) = standardized_mean_difference(
            &train_col.numeric_values().collect::<Vec<_>>(),
            &test_col.numeric_values().collect::<Vec<_>>(),
        ) else {
            continue;
        };
        if smd > config.drift_threshold {
            report.violations.push(Violation::Drift {
                column: name.clone(),
                smd,
                threshold: config.drift_threshold,
            });
        }
    }
}

/// `|mean_train - mean_test| / std_train`, or `None` when either side is
/// empty. A constant train column that still moved between partitions counts
/// as infinite drift.
fn standardized_mean_difference(train: &[f64], test: &[f64]) -> Option<f64> {
    if train.is_empty() || test.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = |vs: &[f64]| vs.iter().sum::<f64>() / vs.len() as f64;
    let train_mean = mean(train);
    let test_mean = mean(test);
    #[allow(clippy::cast_precision_loss)]
    let variance =
        train.iter().map(|v| (v - train_mean).powi(2)).sum::<f64>() / train.len() as f64;
    let std = variance.sqrt();
    let diff = (train_mean - test_mean).abs();
    if std > 0.0 {
        Some(diff / std)
    } else if diff > 0.0 {
        Some(f64::INFINITY)
    } else {
        Some(0.0)
    }
}
