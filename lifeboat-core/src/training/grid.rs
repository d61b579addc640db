//! Hyperparameter grids
//!
//! Each registry entry carries a discrete grid; the search enumerates the
//! full cartesian product, exactly as the original workflow's grid search
//! did.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Text(String),
    Bool(bool),
}

impl ParamValue {
    /// Get as float; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// One sampled assignment: parameter name -> value
pub type TrialParams = HashMap<String, ParamValue>;

/// A discrete hyperparameter search space
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamGrid {
    entries: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    /// Create an empty grid (one candidate: the model's defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its candidate values
    pub fn add(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.entries.push((name.into(), values));
        self
    }

    /// Add an integer parameter
    pub fn ints(self, name: impl Into<String>, values: &[i64]) -> Self {
        self.add(name, values.iter().map(|&v| ParamValue::Int(v)).collect())
    }

    /// Add a float parameter
    pub fn floats(self, name: impl Into<String>, values: &[f64]) -> Self {
        self.add(name, values.iter().map(|&v| ParamValue::Float(v)).collect())
    }

    /// Enumerate the cartesian product of all parameter values.
    ///
    /// An empty grid yields a single empty assignment so a model with no
    /// grid still gets trained once on its defaults.
    pub fn candidates(&self) -> Vec<TrialParams> {
        let mut result: Vec<TrialParams> = vec![HashMap::new()];

        for (name, values) in &self.entries {
            let mut expanded = Vec::with_capacity(result.len() * values.len());
            for assignment in &result {
                for value in values {
                    let mut next = assignment.clone();
                    next.insert(name.clone(), value.clone());
                    expanded.push(next);
                }
            }
            result = expanded;
        }

        result
    }

    /// Number of parameters in the grid
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
