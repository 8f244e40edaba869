use tracing::{info, warn};

use crate::config::TrainParams;
use crate::constants::train::{CONVERGENCE_TOLERANCE, DECISION_THRESHOLD, LEARNING_RATE};
use crate::errors::PipelineError;
use crate::features::SparseMatrix;
use crate::metrics::{ClassificationReport, Metrics};

/// Fitted logistic-regression classifier.
///
/// A model is only valid for feature matrices produced by the vectorizer in
/// use at its training time; `n_features` records that dimensionality and is
/// checked before every evaluation.
#[derive(Clone, Debug)]
pub struct Model {
    weights: Vec<f32>,
    bias: f32,
    n_features: usize,
}

impl Model {
    /// Feature dimensionality the model expects.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predicted probability of the positive class for each row.
    pub fn predict_proba(&self, x: &SparseMatrix) -> Vec<f32> {
        (0..x.rows)
            .map(|row| {
                let (indices, values) = x.row(row);
                let z: f32 = indices
                    .iter()
                    .zip(values)
                    .map(|(index, value)| self.weights[*index as usize] * value)
                    .sum::<f32>()
                    + self.bias;
                sigmoid(z)
            })
            .collect()
    }

    /// Predicted class label for each row.
    pub fn predict(&self, x: &SparseMatrix) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| u8::from(p >= DECISION_THRESHOLD))
            .collect()
    }
}

/// Fit a logistic-regression classifier with L2 regularization.
///
/// Full-batch gradient descent on the logistic loss, with regularization
/// strength `1 / c` applied to the weights (never the bias) and an iteration
/// budget of `max_iter`. Exhausting the budget without meeting the
/// convergence tolerance is logged, not fatal.
pub fn train(x: &SparseMatrix, y: &[u8], params: &TrainParams) -> Result<Model, PipelineError> {
    if x.rows != y.len() {
        return Err(PipelineError::DimensionMismatch {
            expected: x.rows,
            found: y.len(),
        });
    }
    if x.rows == 0 {
        return Err(PipelineError::Config(
            "cannot train on an empty feature matrix".into(),
        ));
    }

    let n = x.rows as f32;
    let lambda = (1.0 / params.c) as f32 / n;
    let mut weights = vec![0.0f32; x.cols];
    let mut bias = 0.0f32;
    let mut converged = false;
    let mut iterations = 0usize;

    for iter in 0..params.max_iter {
        let mut grad_w = vec![0.0f32; x.cols];
        let mut grad_b = 0.0f32;

        for row in 0..x.rows {
            let (indices, values) = x.row(row);
            let z: f32 = indices
                .iter()
                .zip(values)
                .map(|(index, value)| weights[*index as usize] * value)
                .sum::<f32>()
                + bias;
            let residual = sigmoid(z) - y[row] as f32;
            for (index, value) in indices.iter().zip(values) {
                grad_w[*index as usize] += residual * value / n;
            }
            grad_b += residual / n;
        }
        for (grad, weight) in grad_w.iter_mut().zip(&weights) {
            *grad += lambda * weight;
        }

        let grad_norm: f32 = grad_w
            .iter()
            .map(|g| g * g)
            .sum::<f32>()
            .sqrt()
            .max(grad_b.abs());
        for (weight, grad) in weights.iter_mut().zip(&grad_w) {
            *weight -= LEARNING_RATE * grad;
        }
        bias -= LEARNING_RATE * grad_b;
        iterations = iter + 1;

        if grad_norm < CONVERGENCE_TOLERANCE {
            converged = true;
            break;
        }
    }

    if converged {
        info!(iterations, "training converged");
    } else {
        warn!(
            iterations,
            "iteration budget exhausted before convergence; keeping last iterate"
        );
    }

    Ok(Model {
        weights,
        bias,
        n_features: x.cols,
    })
}

/// Outcome of scoring a model on held-out features.
#[derive(Clone, Debug)]
pub struct EvalOutcome {
    /// Machine-readable accuracy and positive-class F1.
    pub metrics: Metrics,
    /// Per-class precision/recall/F1 report.
    pub report: ClassificationReport,
}

/// Score `model` on held-out features.
///
/// Fails with [`PipelineError::DimensionMismatch`] when the matrix width does
/// not match the dimensionality the model was trained with.
pub fn evaluate(model: &Model, x: &SparseMatrix, y: &[u8]) -> Result<EvalOutcome, PipelineError> {
    if x.cols != model.n_features {
        return Err(PipelineError::DimensionMismatch {
            expected: model.n_features,
            found: x.cols,
        });
    }
    if x.rows != y.len() {
        return Err(PipelineError::DimensionMismatch {
            expected: x.rows,
            found: y.len(),
        });
    }

    let predictions = model.predict(x);
    let report = ClassificationReport::compute(y, &predictions);
    let metrics = Metrics {
        accuracy: report.accuracy,
        f1_score: report.positive_f1(),
    };
    info!(
        accuracy = metrics.accuracy,
        f1 = metrics.f1_score,
        "evaluation complete"
    );
    Ok(EvalOutcome { metrics, report })
}

/// Persisted model record (bitcode, versioned envelope in the store).
#[derive(Clone, Debug, bitcode::Encode, bitcode::Decode)]
pub struct PersistedModel {
    /// Learned weights, one per feature column.
    pub weights: Vec<f32>,
    /// Learned intercept.
    pub bias: f32,
}

impl From<&Model> for PersistedModel {
    fn from(model: &Model) -> Self {
        Self {
            weights: model.weights.clone(),
            bias: model.bias,
        }
    }
}

impl From<PersistedModel> for Model {
    fn from(record: PersistedModel) -> Self {
        let n_features = record.weights.len();
        Self {
            weights: record.weights,
            bias: record.bias,
            n_features,
        }
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainParams;

    fn dense(rows: &[&[f32]]) -> SparseMatrix {
        let cols = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut indptr = vec![0u64];
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for row in rows {
            for (idx, value) in row.iter().enumerate() {
                if *value != 0.0 {
                    indices.push(idx as u32);
                    values.push(*value);
                }
            }
            indptr.push(indices.len() as u64);
        }
        SparseMatrix {
            rows: rows.len(),
            cols,
            indptr,
            indices,
            values,
        }
    }

    fn toy_problem() -> (SparseMatrix, Vec<u8>) {
        let x = dense(&[
            &[1.0, 0.0],
            &[0.9, 0.1],
            &[0.8, 0.0],
            &[0.0, 1.0],
            &[0.1, 0.9],
            &[0.0, 0.8],
        ]);
        let y = vec![1, 1, 1, 0, 0, 0];
        (x, y)
    }

    #[test]
    fn training_separates_a_separable_problem() {
        let (x, y) = toy_problem();
        let params = TrainParams {
            max_iter: 2000,
            c: 10.0,
        };
        let model = train(&x, &y, &params).expect("train");
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.predict(&x), y);
    }

    #[test]
    fn evaluation_reports_perfect_scores_on_training_data() {
        let (x, y) = toy_problem();
        let params = TrainParams {
            max_iter: 2000,
            c: 10.0,
        };
        let model = train(&x, &y, &params).expect("train");
        let outcome = evaluate(&model, &x, &y).expect("evaluate");
        assert!((outcome.metrics.accuracy - 1.0).abs() < 1e-9);
        assert!((outcome.metrics.f1_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_feature_width_fails_evaluation() {
        let (x, y) = toy_problem();
        let params = TrainParams {
            max_iter: 100,
            c: 1.0,
        };
        let model = train(&x, &y, &params).expect("train");
        let wrong = dense(&[&[1.0, 0.0, 0.0]]);
        let err = evaluate(&model, &wrong, &[1]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn persisted_model_round_trips() {
        let (x, y) = toy_problem();
        let params = TrainParams {
            max_iter: 500,
            c: 1.0,
        };
        let model = train(&x, &y, &params).expect("train");
        let restored = Model::from(PersistedModel::from(&model));
        assert_eq!(restored.n_features(), model.n_features());
        assert_eq!(restored.predict(&x), model.predict(&x));
    }
}
