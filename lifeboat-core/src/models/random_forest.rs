//! Random forest classifier

use super::decision_tree::{Criterion, DecisionTree};
use crate::error::{LifeboatError, Result};
use ndarray::{Array1, Array2};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-split feature budget
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of the feature count
    Sqrt,
    /// A fixed number of features
    Fixed(usize),
    /// Every feature
    All,
}

/// Bagged ensemble of decision trees with majority voting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub random_state: Option<u64>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a forest with the given number of trees
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            random_state: None,
        }
    }

    /// Set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set the maximum tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the minimum samples required in a leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set the per-split feature budget
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the bootstrap/subsampling seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Fit the forest to a 0/1 target. Trees are built in parallel, each
    /// on its own bootstrap sample.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(LifeboatError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(LifeboatError::TrainingError("empty training set".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(LifeboatError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "a forest needs at least one tree".to_string(),
            });
        }

        let max_features = self.features_per_split(x.ncols());
        let base_seed = self.random_state.unwrap_or(42);

        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_boot = x.select(ndarray::Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new()
                    .with_criterion(Criterion::Gini)
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_random_state(seed);
                if let Some(depth) = self.max_depth {
                    tree = tree.with_max_depth(depth);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;
        self.trees = trees;

        Ok(())
    }

    /// Predicted class labels by majority vote; ties go to the lower class
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(LifeboatError::ModelNotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let mut votes: HashMap<i64, usize> = HashMap::new();
                for preds in &all_predictions {
                    *votes.entry(preds[i].round() as i64).or_insert(0) += 1;
                }
                votes
                    .into_iter()
                    .max_by_key(|&(class, count)| (count, std::cmp::Reverse(class)))
                    .map(|(class, _)| class as f64)
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        (
            array![
                [0.0, 0.0],
                [0.1, 0.1],
                [0.2, 0.2],
                [1.0, 1.0],
                [1.1, 1.1],
                [1.2, 1.2],
            ],
            array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(10).with_random_state(42);
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.n_trees(), 10);

        let predictions = forest.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count() as f64
            / y.len() as f64;
        assert!(accuracy >= 0.8, "accuracy too low: {accuracy}");
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = separable();

        let mut a = RandomForest::new(5).with_random_state(7);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForest::new(5).with_random_state(7);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(0);
        assert!(matches!(
            forest.fit(&x, &y),
            Err(LifeboatError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let forest = RandomForest::new(3);
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            forest.predict(&x),
            Err(LifeboatError::ModelNotFitted)
        ));
    }
}
