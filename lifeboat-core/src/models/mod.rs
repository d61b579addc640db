//! Candidate classifiers
//!
//! The workflow's estimators are a closed set, so dispatch is an enum
//! rather than trait objects; that keeps a fitted pipeline plainly
//! serializable end to end.

mod decision_tree;
mod logistic;
mod random_forest;

pub use decision_tree::{Criterion, DecisionTree};
pub use logistic::LogisticRegression;
pub use random_forest::{MaxFeatures, RandomForest};

use crate::error::{LifeboatError, Result};
use crate::training::grid::{ParamValue, TrialParams};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A candidate classifier, untrained or fitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    Logistic(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl Classifier {
    /// Short name used in registry entries and log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::Logistic(_) => "logistic_regression",
            Classifier::DecisionTree(_) => "decision_tree",
            Classifier::RandomForest(_) => "random_forest",
        }
    }

    /// Fit to a 0/1 target
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Classifier::Logistic(model) => model.fit(x, y),
            Classifier::DecisionTree(model) => model.fit(x, y),
            Classifier::RandomForest(model) => model.fit(x, y),
        }
    }

    /// Predicted class labels (0.0 / 1.0)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Classifier::Logistic(model) => model.predict(x),
            Classifier::DecisionTree(model) => model.predict(x),
            Classifier::RandomForest(model) => model.predict(x),
        }
    }

    /// Apply one hyperparameter assignment from a search grid
    pub fn apply_params(&mut self, params: &TrialParams) -> Result<()> {
        for (name, value) in params {
            self.apply_param(name, value)?;
        }
        Ok(())
    }

    fn apply_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        let kind = self.kind();
        let invalid = || LifeboatError::InvalidParameter {
            name: name.to_string(),
            value: format!("{value:?}"),
            reason: format!("not a hyperparameter of {kind}"),
        };

        match self {
            Classifier::Logistic(model) => match name {
                "alpha" => model.alpha = value.as_float().ok_or_else(invalid)?,
                "learning_rate" => model.learning_rate = value.as_float().ok_or_else(invalid)?,
                "max_iter" => model.max_iter = value.as_int().ok_or_else(invalid)? as usize,
                _ => return Err(invalid()),
            },
            Classifier::DecisionTree(model) => match name {
                "max_depth" => model.max_depth = Some(value.as_int().ok_or_else(invalid)? as usize),
                "min_samples_split" => {
                    model.min_samples_split = value.as_int().ok_or_else(invalid)? as usize
                }
                "min_samples_leaf" => {
                    model.min_samples_leaf = value.as_int().ok_or_else(invalid)? as usize
                }
                _ => return Err(invalid()),
            },
            Classifier::RandomForest(model) => match name {
                "n_estimators" => {
                    model.n_estimators = value.as_int().ok_or_else(invalid)? as usize
                }
                "max_depth" => model.max_depth = Some(value.as_int().ok_or_else(invalid)? as usize),
                "min_samples_leaf" => {
                    model.min_samples_leaf = value.as_int().ok_or_else(invalid)? as usize
                }
                _ => return Err(invalid()),
            },
        }
        Ok(())
    }
}
