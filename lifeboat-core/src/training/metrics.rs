//! Classification metrics

use crate::error::{LifeboatError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Binary confusion counts; the positive class is label 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Count the four cells over predicted labels
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut matrix = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => matrix.true_positives += 1,
                (false, true) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    /// Support of the positive class
    pub fn positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Support of the negative class
    pub fn negatives(&self) -> usize {
        self.true_negatives + self.false_positives
    }

    /// The same counts with class 0 treated as positive
    pub fn inverted(&self) -> Self {
        Self {
            true_positives: self.true_negatives,
            false_positives: self.false_negatives,
            true_negatives: self.true_positives,
            false_negatives: self.false_positives,
        }
    }
}

/// Evaluation summary for one model on one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    /// Precision of the positive class
    pub precision: f64,
    /// Recall of the positive class
    pub recall: f64,
    /// F1 of the positive class
    pub f1: f64,
    pub n_samples: usize,
    pub confusion: ConfusionMatrix,
}

impl ClassificationMetrics {
    /// Compute all metrics from true and predicted labels
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(LifeboatError::ShapeError {
                expected: format!("predictions of length {}", y_true.len()),
                actual: format!("length {}", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(LifeboatError::ValidationError(
                "cannot score an empty dataset".to_string(),
            ));
        }

        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let correct = confusion.true_positives + confusion.true_negatives;
        let (precision, recall, f1) = precision_recall_f1(&confusion);

        Ok(Self {
            accuracy: correct as f64 / y_true.len() as f64,
            precision,
            recall,
            f1,
            n_samples: y_true.len(),
            confusion,
        })
    }
}

/// Precision/recall/F1 for whichever class the matrix treats as positive.
/// Empty denominators score zero rather than NaN.
pub fn precision_recall_f1(confusion: &ConfusionMatrix) -> (f64, f64, f64) {
    let tp = confusion.true_positives as f64;
    let fp = confusion.false_positives as f64;
    let fn_ = confusion.false_negatives as f64;

    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    (precision, recall, f1)
}

/// Fraction of matching labels
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_confusion_counts() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0];
        let y_pred = array![1.0, 0.0, 0.0, 1.0, 1.0];

        let matrix = ConfusionMatrix::from_predictions(&y_true, &y_pred);
        assert_eq!(matrix.true_positives, 2);
        assert_eq!(matrix.false_negatives, 1);
        assert_eq!(matrix.false_positives, 1);
        assert_eq!(matrix.true_negatives, 1);
        assert_eq!(matrix.positives(), 3);
        assert_eq!(matrix.negatives(), 2);
    }

    #[test]
    fn test_metrics_values() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0];
        let y_pred = array![1.0, 0.0, 0.0, 1.0, 1.0];

        let metrics = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        assert!((metrics.accuracy - 0.6).abs() < 1e-12);
        assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_predictions() {
        let y = array![1.0, 0.0, 1.0];
        let metrics = ClassificationMetrics::compute(&y, &y).unwrap();
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.f1, 1.0);
    }

    #[test]
    fn test_no_positive_predictions_scores_zero() {
        let y_true = array![1.0, 1.0];
        let y_pred = array![0.0, 0.0];

        let metrics = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }

    #[test]
    fn test_length_mismatch_fails() {
        let y_true = array![1.0, 0.0];
        let y_pred = array![1.0];
        assert!(ClassificationMetrics::compute(&y_true, &y_pred).is_err());
    }

    #[test]
    fn test_inverted_matrix() {
        let y_true = array![1.0, 0.0, 0.0];
        let y_pred = array![1.0, 1.0, 0.0];

        let matrix = ConfusionMatrix::from_predictions(&y_true, &y_pred);
        let inverted = matrix.inverted();
        assert_eq!(inverted.true_positives, matrix.true_negatives);
        assert_eq!(inverted.false_positives, matrix.false_negatives);
    }
}
