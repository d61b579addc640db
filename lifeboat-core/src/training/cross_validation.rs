//! Cross-validation splitters

use crate::error::{LifeboatError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cross-validation strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CvStrategy {
    /// Plain K-Fold
    KFold { n_splits: usize, shuffle: bool },
    /// K-Fold that keeps the class ratio of each fold close to the data's
    StratifiedKFold { n_splits: usize, shuffle: bool },
}

/// A single train/test index split
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Splitter over row indices
pub struct CrossValidator {
    strategy: CvStrategy,
    random_state: Option<u64>,
}

impl CrossValidator {
    /// Create a new cross-validator
    pub fn new(strategy: CvStrategy) -> Self {
        Self {
            strategy,
            random_state: None,
        }
    }

    /// Set the shuffle seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate the train/test splits
    pub fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> Result<Vec<CvSplit>> {
        match &self.strategy {
            CvStrategy::KFold { n_splits, shuffle } => {
                self.k_fold(n_samples, *n_splits, *shuffle)
            }
            CvStrategy::StratifiedKFold { n_splits, shuffle } => {
                let y = y.ok_or_else(|| {
                    LifeboatError::ValidationError(
                        "StratifiedKFold requires the target array".to_string(),
                    )
                })?;
                self.stratified_k_fold(y, *n_splits, *shuffle)
            }
        }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn k_fold(&self, n_samples: usize, n_splits: usize, shuffle: bool) -> Result<Vec<CvSplit>> {
        if n_splits < 2 {
            return Err(LifeboatError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(LifeboatError::ValidationError(format!(
                "n_samples ({n_samples}) must be >= n_splits ({n_splits})"
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            indices.shuffle(&mut self.rng());
        }

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;
        for fold_idx in 0..n_splits {
            let base = n_samples / n_splits;
            let fold_size = if fold_idx < n_samples % n_splits {
                base + 1
            } else {
                base
            };

            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CvSplit {
                train_indices,
                test_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(splits)
    }

    fn stratified_k_fold(
        &self,
        y: &Array1<f64>,
        n_splits: usize,
        shuffle: bool,
    ) -> Result<Vec<CvSplit>> {
        if n_splits < 2 {
            return Err(LifeboatError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }

        let mut class_indices: HashMap<i64, Vec<usize>> = HashMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        let mut rng = self.rng();
        if shuffle {
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        // Deal samples from each class round-robin into the folds
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut classes: Vec<i64> = class_indices.keys().copied().collect();
        classes.sort_unstable();
        for class in classes {
            for (i, &idx) in class_indices[&class].iter().enumerate() {
                folds[i % n_splits].push(idx);
            }
        }

        let splits = (0..n_splits)
            .map(|fold_idx| {
                let test_indices = folds[fold_idx].clone();
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, fold)| fold.iter().copied())
                    .collect();
                CvSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }
}

/// A stratified hold-out split: (train indices, held-out indices).
///
/// Used for the final scoring split so accuracy-threshold decisions see the
/// same class balance as the training data.
pub fn stratified_holdout(
    y: &Array1<f64>,
    holdout_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&holdout_fraction) {
        return Err(LifeboatError::InvalidParameter {
            name: "holdout_fraction".to_string(),
            value: holdout_fraction.to_string(),
            reason: "must be in [0, 1)".to_string(),
        });
    }

    let mut class_indices: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, &val) in y.iter().enumerate() {
        class_indices.entry(val.round() as i64).or_default().push(idx);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut holdout = Vec::new();

    let mut classes: Vec<i64> = class_indices.keys().copied().collect();
    classes.sort_unstable();
    for class in classes {
        let mut indices = class_indices[&class].clone();
        indices.shuffle(&mut rng);
        let n_holdout = (indices.len() as f64 * holdout_fraction).round() as usize;
        holdout.extend_from_slice(&indices[..n_holdout]);
        train.extend_from_slice(&indices[n_holdout..]);
    }

    if train.is_empty() || holdout.is_empty() {
        return Err(LifeboatError::ValidationError(
            "hold-out split left one side empty".to_string(),
        ));
    }

    train.sort_unstable();
    holdout.sort_unstable();
    Ok((train, holdout))
}

/// Fold scores with their summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScores {
    /// Summarize a set of fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            scores,
            mean,
            std: variance.sqrt(),
        }
    }
}
