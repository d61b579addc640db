//! Decision tree classifier (CART)

use crate::error::{LifeboatError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Impurity criterion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    Gini,
    Entropy,
}

/// Fitted tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Binary decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub criterion: Criterion,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features considered per split; `None` scans all of them
    pub max_features: Option<usize>,
    /// Seed for the per-split feature subsampling
    pub random_state: Option<u64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a classifier tree with gini impurity
    pub fn new() -> Self {
        Self {
            root: None,
            criterion: Criterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
        }
    }

    /// Set the maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the minimum samples required to split a node
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set the minimum samples required in a leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set the impurity criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the per-split feature budget
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set the feature-subsampling seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the tree to a 0/1 target
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

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_node(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let labels: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let stop = indices.len() < self.min_samples_split
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure(&labels);
        if stop {
            return TreeNode::Leaf {
                value: majority_class(&labels),
            };
        }

        let Some((feature_idx, threshold)) = self.best_split(x, y, indices, rng) else {
            return TreeNode::Leaf {
                value: majority_class(&labels),
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        if left_indices.len() < self.min_samples_leaf
            || right_indices.len() < self.min_samples_leaf
        {
            return TreeNode::Leaf {
                value: majority_class(&labels),
            };
        }

        TreeNode::Split {
            feature_idx,
            threshold,
            left: Box::new(self.build_node(x, y, &left_indices, depth + 1, rng)),
            right: Box::new(self.build_node(x, y, &right_indices, depth + 1, rng)),
        }
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = match self.max_features {
            Some(m) if m < n_features => sample(rng, n_features, m).into_vec(),
            _ => (0..n_features).collect(),
        };

        let labels: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = self.impurity(&labels);
        let n = indices.len() as f64;

        let mut best: Option<(usize, f64, f64)> = None;

        for feature_idx in candidates {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left: Vec<f64> = Vec::new();
                let mut right: Vec<f64> = Vec::new();
                for &idx in indices {
                    if x[[idx, feature_idx]] <= threshold {
                        left.push(y[idx]);
                    } else {
                        right.push(y[idx]);
                    }
                }

                if left.len() < self.min_samples_leaf || right.len() < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left.len() as f64 * self.impurity(&left)
                    + right.len() as f64 * self.impurity(&right))
                    / n;
                let gain = parent_impurity - weighted;

                if gain > 0.0 && best.is_none_or(|(_, _, g)| gain > g) {
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }

        best.map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }

    fn impurity(&self, labels: &[f64]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let n = labels.len() as f64;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &val in labels {
            *counts.entry(val.round() as i64).or_insert(0) += 1;
        }

        match self.criterion {
            Criterion::Gini => {
                1.0 - counts
                    .values()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Entropy => -counts
                .values()
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }

    /// Predicted class labels (0.0 / 1.0)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(LifeboatError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i);
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value } => break *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if row[*feature_idx] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Depth of the fitted tree
    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

fn is_pure(labels: &[f64]) -> bool {
    labels
        .first()
        .map_or(true, |&first| labels.iter().all(|&v| (v - first).abs() < 1e-10))
}

fn majority_class(labels: &[f64]) -> f64 {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &val in labels {
        *counts.entry(val.round() as i64).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(class, count)| (count, std::cmp::Reverse(class)))
        .map(|(class, _)| class as f64)
        .unwrap_or(0.0)
}
