//! Transformation: fit on train, apply to both partitions.

use crate::artifact::{IngestionArtifact, TransformationArtifact, ValidationArtifact};
use crate::error::PipelineError;
use crate::transform::FittedTransformer;
use modelgate_schema::PipelineConfig;
use ndarray::Array2;
use std::path::Path;

/// Fit the feature transformer on the train partition only and encode both
/// partitions with it.
///
/// Refuses to run on invalid data: the validation artifact must report
/// `is_valid = true`.
///
/// # Errors
/// - [`PipelineError::Transformation`] when validation did not pass or
///   fitting/encoding fails
/// - [`PipelineError::Io`] when persisting an output fails
pub fn run(
    config: &PipelineConfig,
    ingestion: &IngestionArtifact,
    validation: &ValidationArtifact,
    run_dir: &Path,
) -> Result<TransformationArtifact, PipelineError> {
    if !validation.is_valid {
        return Err(PipelineError::Transformation(
            "refusing to transform data that failed validation".into(),
        ));
    }

    let transformer = FittedTransformer::fit(&ingestion.train, &config.schema)?;

    let x_train = transformer.apply(&ingestion.train)?;
    let x_test = transformer.apply(&ingestion.test)?;

    let classes = FittedTransformer::target_classes(&ingestion.train, &config.schema)?;
    if classes.len() != 2 {
        return Err(PipelineError::Transformation(format!(
            "binary classification requires exactly 2 target classes, found {}",
            classes.len()
        )));
    }
    let classes = [classes[0].clone(), classes[1].clone()];
    let positive = &classes[1];
    let y_train = FittedTransformer::target_vector(&ingestion.train, &config.schema, positive)?;
    let y_test = FittedTransformer::target_vector(&ingestion.test, &config.schema, positive)?;

    let transformer_path = run_dir.join("transformer.json");
    let payload = serde_json::to_vec_pretty(&transformer)?;
    std::fs::write(&transformer_path, payload)
        .map_err(|e| PipelineError::io(&transformer_path, e))?;

    let train_matrix_path = run_dir.join("train_matrix.csv");
    let test_matrix_path = run_dir.join("test_matrix.csv");
    write_matrix(&x_train, &train_matrix_path)?;
    write_matrix(&x_test, &test_matrix_path)?;

    tracing::info!(
        features = transformer.output_width(),
        train_rows = x_train.nrows(),
        test_rows = x_test.nrows(),
        "transformation complete"
    );

    Ok(TransformationArtifact {
        transformer,
        x_train,
        y_train,
        x_test,
        y_test,
        classes,
        transformer_path,
        train_matrix_path,
        test_matrix_path,
    })
}

/// Persist an encoded matrix as headerless CSV of floats.
fn write_matrix(matrix: &Array2<f64>, path: &Path) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        PipelineError::Transformation(format!("cannot write matrix {}: {e}", path.display()))
    })?;
    for row in matrix.rows() {
        let record: Vec<String> = row.iter().map(ToString::to_string).collect();
        writer.write_record(&record).map_err(|e| {
            PipelineError::Transformation(format!("cannot write matrix {}: {e}", path.display()))
        })?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ValidationReport;
    use modelgate_frame::{train_test_split, Frame};

    fn config() -> PipelineConfig {
        PipelineConfig::from_yaml(
            r#"
database: db
collection: rows
bucket: registry
schema:
  columns:
    x: float
    region: categorical
    label: bool
  target: label
"#,
        )
        .unwrap()
    }

    fn ingestion(config: &PipelineConfig, n: usize) -> IngestionArtifact {
        let docs: Vec<_> = (0..n)
            .map(|i| {
                serde_json::json!({
                    "x": i as f64,
                    "region": if i % 3 == 0 { "a" } else { "b" },
                    "label": i % 2 == 0,
                })
                .as_object()
                .unwrap()
                .clone()
            })
            .collect();
        let frame = Frame::from_documents(&docs, &config.schema).unwrap();
        let (train, test) = train_test_split(&frame, 0.2, 42).unwrap();
        IngestionArtifact {
            train,
            test,
            train_path: "train.csv".into(),
            test_path: "test.csv".into(),
            total_rows: n,
        }
    }

    fn valid(run_dir: &Path) -> ValidationArtifact {
        ValidationArtifact {
            is_valid: true,
            report: ValidationReport::default(),
            report_path: run_dir.join("validation.txt"),
        }
    }

    #[test]
    fn refuses_invalid_data() {
        let config = config();
        let dir = tempfile::tempdir().unwrap();
        let ing = ingestion(&config, 50);
        let invalid = ValidationArtifact {
            is_valid: false,
            report: ValidationReport::default(),
            report_path: dir.path().join("validation.txt"),
        };
        let err = run(&config, &ing, &invalid, dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Transformation(_)));
    }

    #[test]
    fn encodes_both_partitions_with_train_fitted_transformer() {
        let config = config();
        let dir = tempfile::tempdir().unwrap();
        let ing = ingestion(&config, 50);
        let artifact = run(&config, &ing, &valid(dir.path()), dir.path()).unwrap();

        assert_eq!(artifact.x_train.nrows(), ing.train.n_rows());
        assert_eq!(artifact.x_test.nrows(), ing.test.n_rows());
        assert_eq!(artifact.x_train.ncols(), artifact.x_test.ncols());
        assert_eq!(artifact.y_train.len(), ing.train.n_rows());
        assert!(artifact.transformer_path.exists());
        assert!(artifact.train_matrix_path.exists());
        assert!(artifact.test_matrix_path.exists());

        // The persisted transformer is the one in the artifact.
        let raw = std::fs::read(&artifact.transformer_path).unwrap();
        let restored: FittedTransformer = serde_json::from_slice(&raw).unwrap();
        assert_eq!(restored, artifact.transformer);
    }

    #[test]
    fn single_class_target_is_rejected() {
        let config = config();
        let dir = tempfile::tempdir().unwrap();
        let docs: Vec<_> = (0..20)
            .map(|i| {
                serde_json::json!({ "x": i as f64, "region": "a", "label": true })
                    .as_object()
                    .unwrap()
                    .clone()
            })
            .collect();
        let frame = Frame::from_documents(&docs, &config.schema).unwrap();
        let (train, test) = train_test_split(&frame, 0.2, 42).unwrap();
        let ing = IngestionArtifact {
            train,
            test,
            train_path: "train.csv".into(),
            test_path: "test.csv".into(),
            total_rows: 20,
        };
        let err = run(&config, &ing, &valid(dir.path()), dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Transformation(_)));
    }
}
