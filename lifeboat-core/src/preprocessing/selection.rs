//! Univariate feature selection
//!
//! Scores each transformed column against the binary target with a one-way
//! ANOVA F-statistic and keeps the k best. `k = None` keeps every column
//! but still records the scores.

use crate::error::{LifeboatError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// K-best selector over a numeric feature matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectKBest {
    k: Option<usize>,
    scores: Option<Vec<f64>>,
    selected: Option<Vec<usize>>,
}

impl SelectKBest {
    /// Create a selector keeping the k highest-scoring columns
    pub fn new(k: Option<usize>) -> Self {
        Self {
            k,
            scores: None,
            selected: None,
        }
    }

    /// Score every column and pick the winners
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(LifeboatError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let n_features = x.ncols();
        let scores: Vec<f64> = (0..n_features)
            .map(|j| f_score(x.column(j), y.view()))
            .collect();

        let keep = self.k.unwrap_or(n_features).min(n_features);
        let mut indexed: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected: Vec<usize> = indexed.into_iter().take(keep).map(|(i, _)| i).collect();
        // Column order of the input is preserved in the output
        selected.sort_unstable();

        self.scores = Some(scores);
        self.selected = Some(selected);
        Ok(self)
    }

    /// Keep only the selected columns
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let selected = self.selected.as_ref().ok_or(LifeboatError::ModelNotFitted)?;

        let mut result = Array2::zeros((x.nrows(), selected.len()));
        for (new_idx, &old_idx) in selected.iter().enumerate() {
            result.column_mut(new_idx).assign(&x.column(old_idx));
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Array2<f64>> {
        self.fit(x, y)?;
        self.transform(x)
    }

    /// Indices of the selected columns, in input order
    pub fn selected_indices(&self) -> Option<&[usize]> {
        self.selected.as_deref()
    }

    /// Per-column F-scores
    pub fn scores(&self) -> Option<&[f64]> {
        self.scores.as_deref()
    }
}

/// One-way ANOVA F-statistic for a binary target.
///
/// Degenerate inputs (a single class, constant column) score zero instead
/// of erroring so a useless column simply never wins.
fn f_score(feature: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = feature.len();
    let (mut n0, mut n1) = (0usize, 0usize);
    let (mut sum0, mut sum1) = (0.0f64, 0.0f64);

    for (&x, &label) in feature.iter().zip(y.iter()) {
        if label > 0.5 {
            n1 += 1;
            sum1 += x;
        } else {
            n0 += 1;
            sum0 += x;
        }
    }

    if n0 == 0 || n1 == 0 || n <= 2 {
        return 0.0;
    }

    let mean0 = sum0 / n0 as f64;
    let mean1 = sum1 / n1 as f64;
    let grand_mean = (sum0 + sum1) / n as f64;

    let between = n0 as f64 * (mean0 - grand_mean).powi(2)
        + n1 as f64 * (mean1 - grand_mean).powi(2);

    let within: f64 = feature
        .iter()
        .zip(y.iter())
        .map(|(&x, &label)| {
            let mean = if label > 0.5 { mean1 } else { mean0 };
            (x - mean).powi(2)
        })
        .sum();

    if within <= f64::EPSILON {
        return 0.0;
    }

    // k = 2 groups: between df = 1, within df = n - 2
    between / (within / (n - 2) as f64)
}
