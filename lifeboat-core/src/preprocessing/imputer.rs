//! Missing value imputation

use crate::error::{LifeboatError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Strategy for filling missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the column mean (numeric only)
    Mean,
    /// Replace with the column median (numeric only)
    Median,
    /// Replace with the most frequent value; ties pick the smallest value
    MostFrequent,
    /// Replace with a constant number
    Constant(f64),
    /// Replace with a constant string (categorical)
    ConstantString(String),
}

/// Per-column imputer; fitted fill values travel with the pipeline artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, ImputeValue>,
    is_fitted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    Text(String),
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn a fill value for each of the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| LifeboatError::FeatureNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();

            let fill_value = self.compute_fill_value(series)?;
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill missing values in every fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(LifeboatError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            let column = df
                .column(col_name)
                .map_err(|_| LifeboatError::FeatureNotFound(col_name.to_string()))?;
            let filled = fill_series(column.as_materialized_series(), fill_value)?;
            result = result.with_column(filled)?.clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn compute_fill_value(&self, series: &Series) -> Result<ImputeValue> {
        match &self.strategy {
            ImputeStrategy::Mean => {
                let mean = float_values(series)?.mean().unwrap_or(0.0);
                Ok(ImputeValue::Numeric(mean))
            }
            ImputeStrategy::Median => {
                let median = float_values(series)?.median().unwrap_or(0.0);
                Ok(ImputeValue::Numeric(median))
            }
            ImputeStrategy::MostFrequent => {
                if series.dtype() == &DataType::String {
                    Ok(ImputeValue::Text(most_frequent_text(series)?))
                } else {
                    Ok(ImputeValue::Numeric(most_frequent_number(series)?))
                }
            }
            ImputeStrategy::Constant(val) => Ok(ImputeValue::Numeric(*val)),
            ImputeStrategy::ConstantString(val) => Ok(ImputeValue::Text(val.clone())),
        }
    }
}

fn fill_series(series: &Series, fill_value: &ImputeValue) -> Result<Series> {
    match fill_value {
        ImputeValue::Numeric(val) => {
            let filled = float_values(series)?
                .fill_null_with_values(*val)
                .map_err(|e| LifeboatError::DataError(e.to_string()))?;
            Ok(filled.into_series().with_name(series.name().clone()))
        }
        ImputeValue::Text(val) => {
            let filled: StringChunked = series
                .str()
                .map_err(|e| LifeboatError::DataError(e.to_string()))?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(val.as_str())))
                .collect();
            Ok(filled.into_series().with_name(series.name().clone()))
        }
    }
}

fn float_values(series: &Series) -> Result<Float64Chunked> {
    Ok(series
        .cast(&DataType::Float64)
        .map_err(|e| LifeboatError::DataError(e.to_string()))?
        .f64()
        .map_err(|e| LifeboatError::DataError(e.to_string()))?
        .clone())
}

/// Mode of a numeric column: sort the observed values and take the longest
/// run, so ties resolve to the smallest value.
fn most_frequent_number(series: &Series) -> Result<f64> {
    let mut values: Vec<f64> = float_values(series)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Ok(0.0);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut best = values[0];
    let mut best_count = 0usize;
    let mut current = values[0];
    let mut count = 0usize;
    for v in values {
        if (v - current).abs() < f64::EPSILON {
            count += 1;
        } else {
            current = v;
            count = 1;
        }
        if count > best_count {
            best_count = count;
            best = current;
        }
    }
    Ok(best)
}

/// Mode of a string column; the BTreeMap walk keeps the smallest value on ties.
fn most_frequent_text(series: &Series) -> Result<String> {
    let ca = series
        .str()
        .map_err(|e| LifeboatError::DataError(e.to_string()))?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in ca.into_iter().flatten() {
        *counts.entry(val).or_insert(0) += 1;
    }

    let mut best = "";
    let mut best_count = 0usize;
    for (val, count) in counts {
        if count > best_count {
            best_count = count;
            best = val;
        }
    }
    Ok(best.to_string())
}
