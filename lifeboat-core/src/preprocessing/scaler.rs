//! Feature scaling

use crate::error::{LifeboatError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Learned center/scale per column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,
    scale: f64,
}

/// Feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| LifeboatError::FeatureNotFound(col_name.to_string()))?;
            let ca = float_values(column.as_materialized_series())?;

            let params = match self.scaler_type {
                ScalerType::Standard => {
                    let mean = ca.mean().unwrap_or(0.0);
                    let std = ca.std(1).unwrap_or(1.0);
                    ScalerParams {
                        center: mean,
                        scale: if std == 0.0 { 1.0 } else { std },
                    }
                }
                ScalerType::MinMax => {
                    let min = ca.min().unwrap_or(0.0);
                    let max = ca.max().unwrap_or(1.0);
                    let range = max - min;
                    ScalerParams {
                        center: min,
                        scale: if range == 0.0 { 1.0 } else { range },
                    }
                }
                ScalerType::None => ScalerParams {
                    center: 0.0,
                    scale: 1.0,
                },
            };
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(LifeboatError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, params) in &self.params {
            let column = df
                .column(col_name)
                .map_err(|_| LifeboatError::FeatureNotFound(col_name.to_string()))?;
            let ca = float_values(column.as_materialized_series())?;

            let scaled: Float64Chunked = ca
                .into_iter()
                .map(|opt| opt.map(|v| (v - params.center) / params.scale))
                .collect();

            result = result
                .with_column(scaled.into_series().with_name(col_name.as_str().into()))?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
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
