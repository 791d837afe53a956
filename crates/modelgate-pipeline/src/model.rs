//! Binary logistic-regression classifier.
//!
//! Full-batch gradient descent with zero-initialized weights: fitting the
//! same matrices with the same hyperparameters always produces the same
//! model. Inputs arrive already encoded and scaled by the paired
//! [`FittedTransformer`].
//!
//! [`FittedTransformer`]: crate::transform::FittedTransformer

use crate::error::PipelineError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Trainer hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Gradient-descent step size
    pub learning_rate: f64,
    /// Full-batch epochs
    pub epochs: usize,
    /// L2 regularization strength
    pub l2: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 200,
            l2: 1e-4,
        }
    }
}

impl LogisticRegression {
    /// Fit on an encoded train matrix and 0/1 labels.
    ///
    /// `classes` are the label renderings in sorted order; index 1 is the
    /// positive class the 1.0 labels refer to.
    ///
    /// # Errors
    /// Returns [`PipelineError::Training`] if the matrix is empty, shapes
    /// disagree, there are not exactly two classes, or the loss goes
    /// non-finite.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        classes: [String; 2],
    ) -> Result<FittedModel, PipelineError> {
        let (rows, cols) = x.dim();
        if rows == 0 || cols == 0 {
            return Err(PipelineError::Training("empty feature matrix".into()));
        }
        if y.len() != rows {
            return Err(PipelineError::Training(format!(
                "feature matrix has {rows} rows but {} labels",
                y.len()
            )));
        }

        let mut weights = Array1::<f64>::zeros(cols);
        let mut bias = 0.0f64;
        #[allow(clippy::cast_precision_loss)]
        let n = rows as f64;

        for epoch in 0..self.epochs {
            let logits = x.dot(&weights) + bias;
            let predictions = logits.mapv(sigmoid);
            let residual = &predictions - y;

            let grad_w = x.t().dot(&residual) / n + self.l2 * &weights;
            let grad_b = residual.sum() / n;

            weights = weights - self.learning_rate * &grad_w;
            bias -= self.learning_rate * grad_b;

            if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                return Err(PipelineError::Training(format!(
                    "diverged at epoch {epoch}: non-finite parameters"
                )));
            }
        }

        Ok(FittedModel {
            weights: weights.to_vec(),
            bias,
            classes,
        })
    }
}

/// A fitted binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    weights: Vec<f64>,
    bias: f64,
    /// Label renderings; index 1 is the positive class
    classes: [String; 2],
}

impl FittedModel {
    /// Positive-class probability per row.
    ///
    /// # Errors
    /// Returns [`PipelineError::Training`] on a feature-width mismatch,
    /// which indicates an unpaired transformer.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        if x.ncols() != self.weights.len() {
            return Err(PipelineError::Training(format!(
                "model expects {} features, matrix has {}",
                self.weights.len(),
                x.ncols()
            )));
        }
        let weights = Array1::from_vec(self.weights.clone());
        Ok((x.dot(&weights) + self.bias).mapv(sigmoid))
    }

    /// Predicted 0/1 labels at the 0.5 threshold.
    ///
    /// # Errors
    /// Same as [`FittedModel::predict_proba`].
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        Ok(self
            .predict_proba(x)?
            .mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Accuracy against 0/1 labels.
    ///
    /// # Errors
    /// Same as [`FittedModel::predict_proba`], plus a label-count mismatch.
    pub fn accuracy(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64, PipelineError> {
        if y.is_empty() {
            return Err(PipelineError::Training("no labels to score against".into()));
        }
        let predicted = self.predict(x)?;
        if predicted.len() != y.len() {
            return Err(PipelineError::Training(format!(
                "{} predictions against {} labels",
                predicted.len(),
                y.len()
            )));
        }
        let correct = predicted
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < f64::EPSILON)
            .count();
        #[allow(clippy::cast_precision_loss)]
        Ok(correct as f64 / y.len() as f64)
    }

    /// Class rendering for a 0/1 prediction.
    #[must_use]
    pub fn class_label(&self, prediction: f64) -> &str {
        if prediction >= 0.5 {
            &self.classes[1]
        } else {
            &self.classes[0]
        }
    }

    /// The positive class this model's 1.0 labels refer to.
    #[inline]
    #[must_use]
    pub fn positive_class(&self) -> &str {
        &self.classes[1]
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
