//! Feature transformation: imputation, one-hot encoding, scaling.
//!
//! A [`FittedTransformer`] is fitted **exclusively on the train partition**
//! and then applied unchanged to both partitions — the leakage-prevention
//! invariant of the pipeline. Applying a fitted transformer is a pure
//! function of its input: the same frame always encodes to the same matrix.

use crate::error::PipelineError;
use modelgate_frame::{Cell, Column, Frame};
use modelgate_schema::{ColumnKind, DatasetSchema};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Per-feature fitted encoder state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum FeatureEncoder {
    /// Numeric column: impute with the train mean, then standardize with the
    /// train mean/std.
    Numeric {
        name: String,
        impute: f64,
        mean: f64,
        std: f64,
    },
    /// Categorical column: impute with the train mode, then one-hot over the
    /// train categories. Categories unseen at fit time encode to all zeros.
    Categorical {
        name: String,
        impute: String,
        categories: Vec<String>,
    },
    /// Boolean column: impute with the train majority, encode as 0/1.
    Boolean { name: String, impute: bool },
}

impl FeatureEncoder {
    fn width(&self) -> usize {
        match self {
            Self::Numeric { .. } | Self::Boolean { .. } => 1,
            Self::Categorical { categories, .. } => categories.len(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. }
            | Self::Categorical { name, .. }
            | Self::Boolean { name, .. } => name,
        }
    }
}

/// Transformer fitted on one train partition under one schema.
///
/// Records the fingerprint of the schema it was fitted on; it must never be
/// applied to data shaped by a different schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    schema_fingerprint: String,
    features: Vec<FeatureEncoder>,
}

impl FittedTransformer {
    /// Fit imputation, encoding, and scaling statistics on the train
    /// partition.
    ///
    /// # Errors
    /// Returns [`PipelineError::Transformation`] if the partition is empty or
    /// a categorical column is entirely null; [`PipelineError::Frame`] if a
    /// feature column is missing.
    pub fn fit(train: &Frame, schema: &DatasetSchema) -> Result<Self, PipelineError> {
        if train.is_empty() {
            return Err(PipelineError::Transformation(
                "cannot fit a transformer on an empty train partition".into(),
            ));
        }

        let mut features = Vec::new();
        for (name, kind) in schema.feature_columns() {
            let column = train
                .require_column(name)
                .map_err(|e| PipelineError::frame("transformation", e))?;
            features.push(Self::fit_feature(name, kind, column)?);
        }

        Ok(Self {
            schema_fingerprint: schema.fingerprint(),
            features,
        })
    }

    fn fit_feature(
        name: &str,
        kind: ColumnKind,
        column: &Column,
    ) -> Result<FeatureEncoder, PipelineError> {
        match kind {
            ColumnKind::Float | ColumnKind::Int => {
                let values: Vec<f64> = column.numeric_values().collect();
                if values.is_empty() {
                    return Err(PipelineError::Transformation(format!(
                        "numeric column `{name}` is entirely null"
                    )));
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / values.len() as f64;
                let std = variance.sqrt();
                Ok(FeatureEncoder::Numeric {
                    name: name.to_string(),
                    impute: mean,
                    mean,
                    // A constant column still scales; dividing by 1 keeps it
                    // constant instead of NaN.
                    std: if std > 0.0 { std } else { 1.0 },
                })
            }
            ColumnKind::Categorical => {
                let mut counts: std::collections::BTreeMap<&str, usize> =
                    std::collections::BTreeMap::new();
                for cell in column.cells() {
                    if let Some(text) = cell.as_text() {
                        *counts.entry(text).or_insert(0) += 1;
                    }
                }
                if counts.is_empty() {
                    return Err(PipelineError::Transformation(format!(
                        "categorical column `{name}` is entirely null"
                    )));
                }
                let categories: Vec<String> =
                    counts.keys().map(|v| (*v).to_string()).collect();
                // Mode; ties break to the lexicographically first value.
                let mut ranked: Vec<(String, usize)> = counts
                    .into_iter()
                    .map(|(value, count)| (value.to_string(), count))
                    .collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                let impute = ranked[0].0.clone();
                Ok(FeatureEncoder::Categorical {
                    name: name.to_string(),
                    impute,
                    categories,
                })
            }
            ColumnKind::Bool => {
                let mut trues = 0usize;
                let mut falses = 0usize;
                for cell in column.cells() {
                    match cell {
                        Cell::Bool(true) => trues += 1,
                        Cell::Bool(false) => falses += 1,
                        _ => {}
                    }
                }
                Ok(FeatureEncoder::Boolean {
                    name: name.to_string(),
                    impute: trues >= falses,
                })
            }
        }
    }

    /// Encode a frame into a dense feature matrix.
    ///
    /// Pure and deterministic: applying twice to the same frame yields
    /// identical output.
    ///
    /// # Errors
    /// Returns [`PipelineError::Frame`] if the frame lacks a fitted feature
    /// column.
    pub fn apply(&self, frame: &Frame) -> Result<Array2<f64>, PipelineError> {
        let width = self.output_width();
        let mut data = Vec::with_capacity(frame.n_rows() * width);

        // Column handles resolved once, in fitted feature order.
        let mut columns = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let column = frame
                .require_column(feature.name())
                .map_err(|e| PipelineError::frame("transformation", e))?;
            columns.push(column);
        }

        for row in 0..frame.n_rows() {
            for (feature, column) in self.features.iter().zip(&columns) {
                let cell = column.cell(row).unwrap_or(&Cell::Null);
                match feature {
                    FeatureEncoder::Numeric {
                        impute, mean, std, ..
                    } => {
                        let value = cell.as_f64().unwrap_or(*impute);
                        data.push((value - mean) / std);
                    }
                    FeatureEncoder::Categorical {
                        impute, categories, ..
                    } => {
                        let value = cell.as_text().unwrap_or(impute.as_str());
                        for category in categories {
                            data.push(if category == value { 1.0 } else { 0.0 });
                        }
                    }
                    FeatureEncoder::Boolean { impute, .. } => {
                        let value = match cell {
                            Cell::Bool(b) => *b,
                            _ => *impute,
                        };
                        data.push(f64::from(u8::from(value)));
                    }
                }
            }
        }

        Array2::from_shape_vec((frame.n_rows(), width), data)
            .map_err(|e| PipelineError::Transformation(e.to_string()))
    }

    /// Extract the 0/1 label vector for the schema target column.
    ///
    /// # Errors
    /// Returns [`PipelineError::Frame`] if the target column is missing;
    /// [`PipelineError::Transformation`] if a target cell is null.
    pub fn target_vector(
        frame: &Frame,
        schema: &DatasetSchema,
        positive_class: &str,
    ) -> Result<Array1<f64>, PipelineError> {
        let column = frame
            .require_column(&schema.target)
            .map_err(|e| PipelineError::frame("transformation", e))?;
        let mut labels = Vec::with_capacity(column.len());
        for (row, cell) in column.cells().enumerate() {
            if cell.is_null() {
                return Err(PipelineError::Transformation(format!(
                    "target column `{}` is null at row {row}",
                    schema.target
                )));
            }
            labels.push(if cell.render() == positive_class { 1.0 } else { 0.0 });
        }
        Ok(Array1::from_vec(labels))
    }

    /// Distinct target classes in canonical rendering, sorted.
    ///
    /// # Errors
    /// Returns [`PipelineError::Frame`] if the target column is missing.
    pub fn target_classes(
        frame: &Frame,
        schema: &DatasetSchema,
    ) -> Result<Vec<String>, PipelineError> {
        let column = frame
            .require_column(&schema.target)
            .map_err(|e| PipelineError::frame("transformation", e))?;
        let mut classes: Vec<String> = column
            .cells()
            .filter(|c| !c.is_null())
            .map(Cell::render)
            .collect();
        classes.sort();
        classes.dedup();
        Ok(classes)
    }

    /// Total encoded feature width.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.features.iter().map(FeatureEncoder::width).sum()
    }

    /// Fingerprint of the schema this transformer was fitted on.
    #[inline]
    #[must_use]
    pub fn schema_fingerprint(&self) -> &str {
        &self.schema_fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn schema() -> DatasetSchema {
        DatasetSchema {
            columns: [
                ("age".to_string(), ColumnKind::Int),
                ("premium".to_string(), ColumnKind::Float),
                ("region".to_string(), ColumnKind::Categorical),
                ("insured".to_string(), ColumnKind::Bool),
                ("response".to_string(), ColumnKind::Bool),
            ]
            .into_iter()
            .collect(),
            target: "response".to_string(),
        }
    }

    fn frame(rows: &[(i64, f64, &str, bool, bool)]) -> Frame {
        let docs: Vec<_> = rows
            .iter()
            .map(|(age, premium, region, insured, response)| {
                serde_json::json!({
                    "age": age,
                    "premium": premium,
                    "region": region,
                    "insured": insured,
                    "response": response,
                })
                .as_object()
                .unwrap()
                .clone()
            })
            .collect();
        Frame::from_documents(&docs, &schema()).unwrap()
    }

    #[test]
    fn encodes_expected_width() {
        let train = frame(&[
            (30, 100.0, "north", true, true),
            (40, 200.0, "south", false, false),
            (50, 300.0, "north", true, true),
        ]);
        let t = FittedTransformer::fit(&train, &schema()).unwrap();
        // age + premium + {north, south} + insured
        assert_eq!(t.output_width(), 5);
        let x = t.apply(&train).unwrap();
        assert_eq!(x.dim(), (3, 5));
    }

    #[test]
    fn application_is_idempotent() {
        let train = frame(&[
            (30, 100.0, "north", true, true),
            (40, 200.0, "south", false, false),
            (50, 300.0, "east", true, true),
        ]);
        let t = FittedTransformer::fit(&train, &schema()).unwrap();
        let a = t.apply(&train).unwrap();
        let b = t.apply(&train).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scaling_uses_train_statistics_only() {
        let train = frame(&[(10, 0.0, "a", true, true), (20, 10.0, "a", false, false)]);
        let test = frame(&[(30, 20.0, "a", true, true)]);
        let t = FittedTransformer::fit(&train, &schema()).unwrap();
        let x = t.apply(&test).unwrap();
        // age: mean 15, std 5 -> (30 - 15) / 5 = 3
        assert!((x[[0, 0]] - 3.0).abs() < 1e-12);
        // premium: mean 5, std 5 -> (20 - 5) / 5 = 3
        assert!((x[[0, 1]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn unseen_category_encodes_to_zeros() {
        let train = frame(&[(1, 1.0, "north", true, true), (2, 2.0, "south", false, false)]);
        let test = frame(&[(3, 3.0, "west", true, true)]);
        let t = FittedTransformer::fit(&train, &schema()).unwrap();
        let x = t.apply(&test).unwrap();
        // Columns 2..4 are the one-hot block.
        assert_eq!(x[[0, 2]], 0.0);
        assert_eq!(x[[0, 3]], 0.0);
    }

    #[test]
    fn nulls_are_imputed_with_train_statistics() {
        let train = frame(&[(10, 1.0, "a", true, true), (20, 3.0, "b", false, false)]);
        let mut doc = serde_json::json!({
            "age": 15, "premium": 2.0, "region": "a", "insured": true, "response": true
        })
        .as_object()
        .unwrap()
        .clone();
        doc.insert("premium".to_string(), Value::Null);
        let test = Frame::from_documents(&[doc], &schema()).unwrap();

        let t = FittedTransformer::fit(&train, &schema()).unwrap();
        let x = t.apply(&test).unwrap();
        // premium imputed with train mean 2.0 -> scaled to 0.
        assert!((x[[0, 1]]).abs() < 1e-12);
    }

    #[test]
    fn target_vector_maps_positive_class() {
        let f = frame(&[(1, 1.0, "a", true, true), (2, 2.0, "b", false, false)]);
        let y = FittedTransformer::target_vector(&f, &schema(), "true").unwrap();
        assert_eq!(y.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn target_classes_are_sorted_and_deduped() {
        let f = frame(&[
            (1, 1.0, "a", true, true),
            (2, 2.0, "b", false, false),
            (3, 3.0, "c", true, true),
        ]);
        let classes = FittedTransformer::target_classes(&f, &schema()).unwrap();
        assert_eq!(classes, vec!["false", "true"]);
    }

    #[test]
    fn missing_feature_column_names_the_stage() {
        let train = frame(&[(1, 1.0, "a", true, true), (2, 2.0, "b", false, false)]);
        let t = FittedTransformer::fit(&train, &schema()).unwrap();

        let mut narrow = schema();
        narrow.columns.shift_remove("age");
        let docs = vec![serde_json::json!({
            "premium": 2.0, "region": "a", "insured": true, "response": true
        })
        .as_object()
        .unwrap()
        .clone()];
        let without_age = Frame::from_documents(&docs, &narrow).unwrap();

        let err = t.apply(&without_age).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Frame {
                stage: "transformation",
                ..
            }
        ));
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn serializes_and_restores() {
        let train = frame(&[(1, 1.0, "a", true, true), (2, 2.0, "b", false, false)]);
        let t = FittedTransformer::fit(&train, &schema()).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let restored: FittedTransformer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
    }
}
